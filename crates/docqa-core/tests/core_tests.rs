use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use docqa_core::config::Config;
use docqa_core::error::Error;
use docqa_core::types::DistanceMetric;

const SAMPLE: &str = r#"{
    "paths": { "docs_directory": "docs", "data_directory": "data", "db_path": "data/lancedb" },
    "database": { "collection_name": "manuals", "distance_metric": "l2" },
    "processing": { "chunk_size": 800, "chunk_overlap": 100 },
    "llm": { "model": "llama-3.1-8b-instant", "temperature": 0.3 }
}"#;

#[test]
fn dotted_lookups_and_defaults() {
    let config = Config::from_json_str(SAMPLE);
    assert_eq!(config.get::<String>("database.collection_name").unwrap(), "manuals");
    assert_eq!(config.get::<usize>("processing.chunk_size").unwrap(), 800);
    assert!((config.get::<f32>("llm.temperature").unwrap() - 0.3).abs() < 1e-6);
    assert_eq!(config.get_or("ui.max_search_results", 5usize), 5);
    assert_eq!(
        config.get::<DistanceMetric>("database.distance_metric").unwrap(),
        DistanceMetric::L2
    );
    assert!(matches!(config.get::<String>("llm.missing"), Err(Error::Config { .. })));
}

#[test]
fn typed_path_accessors() {
    let config = Config::from_json_str(SAMPLE);
    assert_eq!(config.docs_dir().unwrap(), PathBuf::from("docs"));
    assert_eq!(config.data_dir().unwrap(), PathBuf::from("data"));
    assert_eq!(config.db_path().unwrap(), PathBuf::from("data/lancedb"));
}

#[test]
fn missing_or_empty_path_is_invalid() {
    let config = Config::from_json_str(r#"{ "paths": { "docs_directory": "" } }"#);
    assert!(matches!(config.docs_dir(), Err(Error::InvalidConfig(_))));
    assert!(matches!(config.db_path(), Err(Error::InvalidConfig(_))));
}

#[test]
fn load_from_file_and_missing_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.json");
    fs::write(&path, SAMPLE).unwrap();

    let config = Config::load_from(&path).expect("load");
    assert_eq!(config.get::<String>("llm.model").unwrap(), "llama-3.1-8b-instant");

    let missing = tmp.path().join("nope.json");
    assert!(matches!(Config::load_from(&missing), Err(Error::NotFound(_))));
}

#[test]
fn groq_key_rejects_placeholder() {
    let config = Config::from_json_str("{}");
    std::env::set_var("GROQ_API_KEY", "your_groq_api_key_here");
    assert!(config.groq_api_key().is_err());
    std::env::set_var("GROQ_API_KEY", "gsk_test");
    assert_eq!(config.groq_api_key().unwrap(), "gsk_test");
    std::env::remove_var("GROQ_API_KEY");
    assert!(config.groq_api_key().is_err());
}

#[test]
fn distance_metric_accepts_aliases_and_rejects_unknown() {
    let metric = |name: &str| {
        let json = format!(r#"{{ "database": {{ "distance_metric": "{name}" }} }}"#);
        Config::from_json_str(&json).distance_metric()
    };
    assert_eq!(metric("L2").unwrap(), DistanceMetric::L2);
    assert_eq!(metric("euclidean").unwrap(), DistanceMetric::L2);
    assert_eq!(metric("ip").unwrap(), DistanceMetric::Dot);
    assert!(matches!(metric("hamming"), Err(Error::UnknownMetric(name)) if name == "hamming"));
    assert_eq!(Config::from_json_str("{}").distance_metric().unwrap(), DistanceMetric::Cosine);
}

// These cases mutate the process environment and working directory, so they run in one test.
#[test]
fn load_tolerates_missing_file_and_env_overrides_file() {
    let tmp = TempDir::new().unwrap();

    std::env::set_var("DOCQA_CONFIG", tmp.path().join("absent.json"));
    let config = Config::load().expect("missing default file is tolerated");
    assert_eq!(config.get_or("processing.chunk_size", 1000usize), 1000);
    assert!(config.docs_dir().is_err());

    // A `.env` in the working directory wins over an already-exported variable.
    let original_dir = std::env::current_dir().unwrap();
    fs::write(tmp.path().join(".env"), "DOCQA_UI__MAX_SEARCH_RESULTS=9\n").unwrap();
    std::env::set_var("DOCQA_UI__MAX_SEARCH_RESULTS", "3");
    std::env::set_current_dir(tmp.path()).unwrap();
    let config = Config::load();
    std::env::set_current_dir(&original_dir).unwrap();
    assert_eq!(config.unwrap().get::<usize>("ui.max_search_results").unwrap(), 9);
    std::env::remove_var("DOCQA_UI__MAX_SEARCH_RESULTS");
    std::env::remove_var("DOCQA_CONFIG");

    let path = tmp.path().join("config.json");
    fs::write(&path, SAMPLE).unwrap();
    std::env::set_var("DOCQA_PROCESSING__CHUNK_OVERLAP", "150");
    let config = Config::load_from(&path).expect("load");
    assert_eq!(config.get::<usize>("processing.chunk_overlap").unwrap(), 150);
    assert_eq!(config.get::<usize>("processing.chunk_size").unwrap(), 800);
    std::env::remove_var("DOCQA_PROCESSING__CHUNK_OVERLAP");
}
