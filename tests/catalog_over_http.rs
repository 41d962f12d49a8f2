mod asset_stub;

use std::collections::HashMap;
use std::sync::Arc;

use asset_stub::{Asset, AssetStub};
use playdeck::catalog::add::NewPlayable;
use playdeck::catalog::source::source_from_location;
use playdeck::catalog::store::{JsonFileOverrideStore, MemoryOverrideStore};
use playdeck::catalog::{Catalog, LoadOutcome};
use playdeck::config::Profile;

const WEST_JSON: &str = r#"[
  {"title":"Duel","playUrl":"playables/west/Duel.html","screenshot":"playables/west/screens/Duel.png","asanaUrl":"https://app.asana.com/0/1"},
  {"title":"Train","playUrl":"playables/west/Train.html","screenshot":"","asanaUrl":"https://app.asana.com/0/2"}
]"#;

fn catalog_assets(with_mega: bool) -> HashMap<&'static str, Asset> {
    let mut assets = HashMap::from([("/data/west-playables.json", Asset::json(WEST_JSON))]);
    if with_mega {
        assets.insert("/data/mega-playables.json", Asset::json("[]"));
    }
    assets
}

#[tokio::test]
async fn fetches_every_category_and_renders_cards() {
    let stub = AssetStub::spawn(catalog_assets(true));
    let source = source_from_location(&stub.base_url).unwrap();
    let mut catalog = Catalog::new(
        Profile::extended(),
        source,
        Arc::new(MemoryOverrideStore::new()),
    );

    assert_eq!(catalog.load().await, LoadOutcome::Fetched);

    let rendered = catalog.render();
    let west = rendered.section("west").unwrap();
    assert_eq!(west.count_label, "2 плейбла");
    assert!(west.cards_html.contains("background-image: url('playables/west/screens/Duel.png')"));
    assert_eq!(west.cards_html.matches("No preview").count(), 1);
    assert!(west.cards_html.find("Duel") < west.cards_html.find("Train"));

    let mega = rendered.section("mega").unwrap();
    assert_eq!(mega.count_label, "0 плейблов");
    assert!(mega.cards_html.is_empty());
}

#[tokio::test]
async fn one_missing_category_falls_back_to_samples() {
    let stub = AssetStub::spawn(catalog_assets(false));
    let source = source_from_location(&stub.base_url).unwrap();
    let mut catalog = Catalog::new(
        Profile::extended(),
        source,
        Arc::new(MemoryOverrideStore::new()),
    );

    assert_eq!(
        catalog.load().await,
        LoadOutcome::Fallback {
            failed: vec!["mega".to_string()],
        }
    );

    let html = catalog.render_page();
    assert!(html.contains("west_sample"));
    assert!(html.contains("mega_sample"));
    assert!(!html.contains("Duel"));
}

#[tokio::test]
async fn stored_override_survives_restart_without_network() {
    let temp = tempfile::TempDir::new().unwrap();
    let store_path = temp.path().join("catalog.json");

    let stub = AssetStub::spawn(catalog_assets(true));
    let mut catalog = Catalog::new(
        Profile::extended(),
        source_from_location(&stub.base_url).unwrap(),
        Arc::new(JsonFileOverrideStore::new(&store_path)),
    );
    catalog.load().await;
    catalog
        .add_record(
            "mega",
            &NewPlayable {
                title: "Tower".to_string(),
                asana_url: Some("https://app.asana.com/0/3".to_string()),
            },
        )
        .await
        .unwrap();
    let saved = catalog.state().clone();
    drop(stub);

    // Nothing listens here any more; only the override can satisfy the load.
    let offline = source_from_location("http://127.0.0.1:9/").unwrap();
    let mut restarted = Catalog::new(
        Profile::extended(),
        offline,
        Arc::new(JsonFileOverrideStore::new(&store_path)),
    );
    assert_eq!(restarted.load().await, LoadOutcome::Override);
    assert_eq!(restarted.state(), &saved);
    assert_eq!(restarted.render(), catalog.render());
}
