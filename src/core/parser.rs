// src/core/parser.rs

use crate::core::{
    error::{ScriptError, ScriptResult},
    normalizer::{self, SourceLine},
    tree::{BlockId, Instruction, Script, ScriptLine},
};

/// Normalizes and parses script source text in one step.
pub fn parse_source(source: &str) -> ScriptResult<Script> {
    parse(&normalizer::normalize(source))
}

/// Builds the instruction tree from normalized lines.
///
/// A line indented deeper than the current block opens a child block, which is
/// appended right after the previous item. That is how a command's body is
/// expressed: there are no begin/end keywords. A shallower line closes blocks
/// until one with exactly the same depth is found.
///
/// # Errors
/// Returns [`ScriptError::Indentation`] when a line mixes tabs and spaces in its
/// indentation, or when a dedent lands between two open levels.
pub fn parse(lines: &[SourceLine]) -> ScriptResult<Script> {
    let mut script = Script::new();
    let mut open_blocks: Vec<BlockId> = vec![BlockId::ROOT];

    for source_line in lines {
        let depth = indentation_depth(source_line)?;
        let instruction = Instruction::Line(ScriptLine {
            number: source_line.number,
            text: source_line.text.trim().to_string(),
        });

        loop {
            let Some(&top) = open_blocks.last() else {
                unreachable!("the root block is never closed");
            };
            let top_indent = script.block(top).indent;

            if depth == top_indent {
                script.block_mut(top).items.push(instruction);
                break;
            }

            if depth > top_indent {
                let child = script.open_child(top, depth);
                log::trace!(
                    "Line {}: opened block at depth {}",
                    source_line.number,
                    depth
                );
                script.block_mut(child).items.push(instruction);
                open_blocks.push(child);
                break;
            }

            // Dedent: close the current block and retry against its parent.
            open_blocks.pop();
            let parent_indent = open_blocks
                .last()
                .map_or(0, |&parent| script.block(parent).indent);
            if parent_indent < depth {
                return Err(ScriptError::Indentation {
                    line: source_line.number,
                    reason: format!(
                        "indentation of {} does not match any enclosing block",
                        depth
                    ),
                });
            }
        }
    }

    log::debug!(
        "Parsed {} logical lines into {} blocks.",
        lines.len(),
        script.block_count()
    );
    Ok(script)
}

/// Counts the leading indentation characters of a line, requiring one kind only.
fn indentation_depth(line: &SourceLine) -> ScriptResult<usize> {
    let mut depth = 0;
    let mut kind: Option<char> = None;

    for c in line.text.chars() {
        if c != ' ' && c != '\t' {
            break;
        }
        match kind {
            None => kind = Some(c),
            Some(k) if k != c => {
                return Err(ScriptError::Indentation {
                    line: line.number,
                    reason: "tabs and spaces are mixed in the indentation".to_string(),
                });
            }
            Some(_) => {}
        }
        depth += 1;
    }

    Ok(depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalizer::normalize;

    fn line_texts(script: &Script, id: BlockId) -> Vec<String> {
        script
            .block(id)
            .items
            .iter()
            .map(|item| match item {
                Instruction::Line(l) => l.text.clone(),
                Instruction::Block(_) => "<block>".to_string(),
            })
            .collect()
    }

    fn child_at(script: &Script, parent: BlockId, index: usize) -> BlockId {
        match &script.block(parent).items[index] {
            Instruction::Block(id) => *id,
            other => panic!("expected block, got {:?}", other),
        }
    }

    #[test]
    fn test_flat_script_stays_in_root() {
        let script = parse_source("set a 1\nset b 2\necho ${a}").unwrap();
        assert_eq!(script.block_count(), 1);
        assert_eq!(
            line_texts(&script, BlockId::ROOT),
            vec!["set a 1", "set b 2", "echo ${a}"]
        );
    }

    #[test]
    fn test_nested_blocks_follow_their_owner_line() {
        let source = "foreach f files\n    echo ${f}\n    for i 0 2\n        echo ${i}\necho done";
        let script = parse_source(source).unwrap();

        assert_eq!(
            line_texts(&script, BlockId::ROOT),
            vec!["foreach f files", "<block>", "echo done"]
        );
        let body = child_at(&script, BlockId::ROOT, 1);
        assert_eq!(script.block(body).indent, 4);
        assert_eq!(script.nesting_level(body), 1);
        assert_eq!(
            line_texts(&script, body),
            vec!["echo ${f}", "for i 0 2", "<block>"]
        );

        let inner = child_at(&script, body, 2);
        assert_eq!(script.nesting_level(inner), 2);
        assert_eq!(script.block(inner).parent, Some(body));
        assert_eq!(line_texts(&script, inner), vec!["echo ${i}"]);
    }

    #[test]
    fn test_tabs_are_accepted_when_used_alone() {
        let script = parse_source("for i 0 2\n\techo ${i}\n\t\techo deeper").unwrap();
        let body = child_at(&script, BlockId::ROOT, 1);
        assert_eq!(script.block(body).indent, 1);
        let inner = child_at(&script, body, 1);
        assert_eq!(script.block(inner).indent, 2);
    }

    #[test]
    fn test_mixed_indentation_reports_physical_line_number() {
        let source = "# header\n\necho a\nfor i 0 2\n \techo ${i}\n";
        let err = parse_source(source).unwrap_err();
        assert!(matches!(err, ScriptError::Indentation { line: 5, .. }));
    }

    #[test]
    fn test_mixed_indentation_detected_anywhere_in_file() {
        for position in 0..4 {
            let mut lines: Vec<String> = (0..4).map(|i| format!("echo {}", i)).collect();
            lines[position] = format!("\t {}", lines[position]);
            let err = parse_source(&lines.join("\n")).unwrap_err();
            match err {
                ScriptError::Indentation { line, .. } => assert_eq!(line, position + 1),
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }

    #[test]
    fn test_dedent_to_unknown_depth_is_rejected() {
        let source = "for i 0 2\n        echo deep\n    echo between";
        let err = parse_source(source).unwrap_err();
        assert!(matches!(err, ScriptError::Indentation { line: 3, .. }));
    }

    #[test]
    fn test_multi_level_dedent_closes_every_block() {
        let source = "a\n  b\n    c\nd";
        let script = parse_source(source).unwrap();
        assert_eq!(line_texts(&script, BlockId::ROOT), vec!["a", "<block>", "d"]);
    }

    #[test]
    fn test_indented_first_line_becomes_leading_block() {
        let script = parse_source("    echo a\necho b").unwrap();
        assert_eq!(line_texts(&script, BlockId::ROOT), vec!["<block>", "echo b"]);
    }

    #[test]
    fn test_rendering_round_trips_to_an_equivalent_tree() {
        let source = "set x 1\nforeach f files\n\techo ${f}\n\tfor i 0 2\n\t\techo ${i}\n\techo after\necho end";
        let script = parse_source(source).unwrap();
        let rendered = script.to_string();
        assert_eq!(
            rendered,
            "set x 1\nforeach f files\n    echo ${f}\n    for i 0 2\n        echo ${i}\n    echo after\necho end\n"
        );

        let reparsed = parse(&normalize(&rendered)).unwrap();
        assert_eq!(reparsed.block_count(), script.block_count());
        assert_eq!(reparsed.to_string(), rendered);
    }
}
