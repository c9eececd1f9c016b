use std::{
    env,
    error::Error,
    fs,
    path::{Path, PathBuf},
};

fn main() -> Result<(), Box<dyn Error>> {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let src_dir = manifest_dir.join("src");
    let grammar_js_path = manifest_dir.join("grammar.js");
    let grammar_path = src_dir.join("grammar.json");
    let config_path = manifest_dir.join("tree-sitter.json");
    let scanner_path = src_dir.join("scanner.c");

    println!("cargo:rerun-if-changed={}", grammar_js_path.display());
    println!("cargo:rerun-if-changed={}", grammar_path.display());
    println!("cargo:rerun-if-changed={}", config_path.display());

    // `src/grammar.json` is produced from grammar.js by `tree-sitter generate`.
    // The parse tables are rebuilt here from the JSON only.
    if is_newer(&grammar_js_path, &grammar_path) {
        println!(
            "cargo:warning=grammar.js is newer than {}; run `tree-sitter generate` to pick up the edits",
            grammar_path.display()
        );
    }

    let config: serde_json::Value = serde_json::from_str(&fs::read_to_string(&config_path)?)
        .map_err(|err| format!("parsing {}: {err}", config_path.display()))?;
    let expected_name = config["grammars"][0]["name"]
        .as_str()
        .ok_or_else(|| format!("{} has no grammars[0].name", config_path.display()))?;

    let grammar_json = fs::read_to_string(&grammar_path)?;
    let (name, parser_c) = tree_sitter_generate::generate_parser_for_grammar(
        &grammar_json,
        semantic_version(&config),
    )
    .map_err(|err| format!("generating parser from {}: {err}", grammar_path.display()))?;
    if name != expected_name {
        return Err(format!("expected grammar `{expected_name}`, generated `{name}`").into());
    }
    println!("cargo:rustc-env=TREE_SITTER_GRAMMAR_NAME={name}");

    let parser_path = out_dir.join("parser.c");
    fs::write(&parser_path, parser_c)?;
    let header_dir = out_dir.join("tree_sitter");
    fs::create_dir_all(&header_dir)?;
    fs::write(header_dir.join("parser.h"), tree_sitter::PARSER_HEADER)?;

    let mut c_config = cc::Build::new();
    c_config.std("c11").include(&out_dir).include(&src_dir);

    // The generated state machine is far slower unoptimized, even in debug test builds.
    c_config.opt_level(2);
    c_config.flag_if_supported("-Wno-unused-parameter");
    c_config.flag_if_supported("-Wno-unused-but-set-variable");
    c_config.flag_if_supported("-Wno-trigraphs");

    #[cfg(target_env = "msvc")]
    c_config.flag("-utf-8");

    c_config.file(&parser_path);

    if scanner_path.exists() {
        c_config.file(&scanner_path);
        println!("cargo:rerun-if-changed={}", scanner_path.display());
    }

    c_config.compile("tree-sitter-heptagon");
    Ok(())
}

/// True when both files exist and `source` was modified after `generated`.
fn is_newer(source: &Path, generated: &Path) -> bool {
    source
        .metadata()
        .and_then(|sm| {
            generated
                .metadata()
                .and_then(|gm| Ok(sm.modified()? > gm.modified()?))
        })
        .unwrap_or(false)
}

/// Reads `metadata.version` from tree-sitter.json as a `(major, minor, patch)` triple.
fn semantic_version(config: &serde_json::Value) -> Option<(u8, u8, u8)> {
    let version = config["metadata"]["version"].as_str()?;
    let mut parts = version.split('.').map(|part| part.parse::<u8>().ok());
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(Some(major)), Some(Some(minor)), Some(Some(patch)), None) => {
            Some((major, minor, patch))
        }
        _ => {
            println!("cargo:warning=ignoring malformed grammar version `{version}`");
            None
        }
    }
}
