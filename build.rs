// build.rs

// Compiles `locales/<lang>.toml` into the `t!` macro. English is always loaded
// and every other locale is layered on top of it key by key.

use std::collections::BTreeMap;
use std::env;
use std::error::Error;
use std::fs;
use std::path::Path;

type Messages = BTreeMap<String, String>;

const FALLBACK_LANG: &str = "en";
const LANG_ENV: &str = "STAGEHAND_LANG";
const LANG_FEATURE_PREFIX: &str = "CARGO_FEATURE_LANG_";

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-env-changed={LANG_ENV}");
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=locales/");

    let lang = select_language();
    let mut messages = load_locale(FALLBACK_LANG)?
        .ok_or("locales/en.toml is missing; it is the fallback for every language")?;

    if lang != FALLBACK_LANG {
        match load_locale(&lang)? {
            Some(overrides) => {
                for key in overrides.keys().filter(|key| !messages.contains_key(*key)) {
                    println!("cargo:warning=locales/{lang}.toml: '{key}' has no English entry");
                }
                messages.extend(overrides);
            }
            None => println!("cargo:warning=locales/{lang}.toml not found, using English"),
        }
    }

    let out_dir = env::var("OUT_DIR")?;
    fs::write(
        Path::new(&out_dir).join("translations.rs"),
        render_macro(&messages),
    )?;
    Ok(())
}

/// A `lang_*` cargo feature wins over `STAGEHAND_LANG`; English otherwise.
fn select_language() -> String {
    let mut features: Vec<String> = env::vars()
        .filter_map(|(key, _)| key.strip_prefix(LANG_FEATURE_PREFIX).map(str::to_lowercase))
        .collect();
    features.sort();

    if let Some(first) = features.first() {
        if features.len() > 1 {
            println!("cargo:warning=several lang_* features enabled {features:?}, using '{first}'");
        }
        return first.clone();
    }
    env::var(LANG_ENV).unwrap_or_else(|_| FALLBACK_LANG.to_string())
}

fn load_locale(lang: &str) -> Result<Option<Messages>, Box<dyn Error>> {
    let path = format!("locales/{lang}.toml");
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(None);
    };
    let messages: Messages = toml::from_str(&content).map_err(|e| format!("{path}: {e}"))?;
    Ok(Some(messages))
}

/// One literal arm per key, plus a catch-all that turns a typo into a compile error.
fn render_macro(messages: &Messages) -> String {
    let mut code = String::from("#[macro_export]\nmacro_rules! t {\n");
    for (key, value) in messages {
        code.push_str(&format!("    ({key:?}) => {{ {value:?} }};\n"));
    }
    code.push_str(
        "    ($key:expr) => {{ compile_error!(concat!(\"Missing translation key: \", $key)) }};\n",
    );
    code.push_str("}\n");
    code
}
