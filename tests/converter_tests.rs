use m3ucatalog::channels::{parse_m3u, Converter, Quality};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_albania_and_kosova_groups() {
    let data = r#"#EXTM3U
#EXTINF:-1 tvg-name="Test Channel 1 HD" tvg-logo="http://test.com/1.png" group-title="ALBANIA",Test Channel 1
http://test.com/channel1.m3u8
#EXTINF:-1 tvg-name="Test Channel 2 FHD" tvg-logo="http://test.com/2.png" group-title="KOSOVA",Test Channel 2
http://test.com/channel2.m3u8
"#;

    let catalog = parse_m3u(data);
    assert_eq!(catalog.total_channels, 2);
    assert_eq!(catalog.channels[0].id, 1);
    assert_eq!(catalog.channels[1].id, 2);

    let first = &catalog.channels[0];
    assert_eq!(first.quality, Quality::Hd);
    assert_eq!(first.country, "AL");
    assert_eq!(first.category, "┃AL┃ ALBANIA");
    assert_eq!(first.logo, "http://test.com/1.png");
    assert_eq!(first.name, "┃AL┃ Test Channel 1 HD");

    let second = &catalog.channels[1];
    assert_eq!(second.quality, Quality::Fhd);
    assert_eq!(second.category, "┃XK┃ KOSOVA");
    // Nothing in the name points anywhere, so the country falls back to AL.
    assert_eq!(second.country, "AL");

    assert_eq!(catalog.categories.len(), 2);
    assert!(catalog.categories.iter().all(|c| c.count == 1));
    assert_eq!(catalog.categories[1].name, "KOSOVA");
    assert_eq!(catalog.categories[1].icon, "fas fa-flag");
    assert_eq!(catalog.qualities, vec![Quality::Hd, Quality::Fhd]);
}

#[test]
fn test_dangling_metadata_at_end_is_dropped() {
    let data = "#EXTM3U\n#EXTINF:-1,Kept\nhttp://kept\n#EXTINF:-1,Lost HD\n";
    let conversion = Converter::new().convert(data);
    assert_eq!(conversion.catalog.total_channels, 1);
    assert_eq!(conversion.catalog.channels.len(), 1);
    assert_eq!(conversion.catalog.qualities, vec![Quality::Sd]);
    assert_eq!(conversion.stats.dropped_entries, 1);
}

#[test]
fn test_empty_and_header_only_input() {
    for data in ["", "#EXTM3U", "\n\n   \n#EXTM3U\n"] {
        let catalog = parse_m3u(data);
        assert_eq!(catalog.total_channels, 0);
        assert!(catalog.channels.is_empty());
        assert!(catalog.categories.is_empty());
        assert!(catalog.countries.is_empty());
        assert!(catalog.qualities.is_empty());
    }
}

#[test]
fn test_country_from_broadcaster_name() {
    let data = "#EXTINF:-1,CNN International HD\nhttp://cnn/live.m3u8\n";
    let catalog = parse_m3u(data);
    let channel = &catalog.channels[0];
    assert_eq!(channel.country, "US");
    assert_eq!(channel.category, "┃US┃ USA");
    assert_eq!(catalog.categories[0].name, "USA");
    assert_eq!(catalog.categories[0].icon, "fas fa-flag-usa");
    assert_eq!(catalog.countries.get("US").map(String::as_str), Some("SHBA"));
}

#[test]
fn test_tvg_id_country_beats_name_patterns() {
    let data = "#EXTINF:-1 tvg-id=\"cnn.it\",CNN International\nhttp://cnn/it.m3u8\n";
    let catalog = parse_m3u(data);
    let channel = &catalog.channels[0];
    assert_eq!(channel.country, "IT");
    assert_eq!(channel.category, "┃IT┃ ITALIA");
    assert_eq!(channel.name, "┃IT┃ CNN International SD");
    assert_eq!(catalog.countries.get("IT").map(String::as_str), Some("Itali"));
    assert!(catalog.countries.get("US").is_none());
}

#[test]
fn test_parse_is_repeatable() {
    let data = r#"#EXTM3U
#EXTINF:-1 tvg-id="bbc1.uk" group-title="UK",BBC One HD
http://bbc/1
#EXTINF:-1 group-title="Sport",Eurosport 4K
http://euro/1
#EXTINF:-1,Orphaned
#EXTINF:-1 group-title="Sport",Tring Sport (720p)
http://tring/1
"#;
    let converter = Converter::new();
    let first = converter.parse_with_rng(data, &mut StdRng::seed_from_u64(1));
    let second = converter.parse_with_rng(data, &mut StdRng::seed_from_u64(1));
    assert_eq!(first.channels, second.channels);
    assert_eq!(first.categories, second.categories);
    assert_eq!(first.countries, second.countries);
    assert_eq!(first.qualities, second.qualities);

    // With the default RNG only viewers may differ.
    let a = converter.parse(data);
    let b = converter.parse(data);
    assert_eq!(a.categories, b.categories);
    assert_eq!(a.countries, b.countries);
    let strip = |c: &m3ucatalog::channels::Channel| {
        let mut c = c.clone();
        c.viewers = 0;
        c
    };
    assert_eq!(
        a.channels.iter().map(strip).collect::<Vec<_>>(),
        b.channels.iter().map(strip).collect::<Vec<_>>()
    );
}

#[test]
fn test_ids_are_gapless() {
    let data = "#EXTINF:-1,A\nhttp://a\n#EXTINF:-1,B\n#EXTINF:-1,C\nhttp://c\nhttp://stray\n#EXTINF:-1,D\nhttp://d\n";
    let catalog = parse_m3u(data);
    for (i, channel) in catalog.channels.iter().enumerate() {
        assert_eq!(channel.id as usize, i + 1);
    }
    assert_eq!(catalog.total_channels, 3);
}

#[test]
fn test_highest_quality_token_wins() {
    let catalog = parse_m3u("#EXTINF:-1,HD Cinema 4K\nhttp://cinema\n");
    assert_eq!(catalog.channels[0].quality, Quality::Uhd4k);
}

#[test]
fn test_category_sort_by_count() {
    let data = r#"#EXTINF:-1 group-title="Music",M1
http://m/1
#EXTINF:-1 group-title="News",N1
http://n/1
#EXTINF:-1 group-title="News",N2
http://n/2
#EXTINF:-1 group-title="Kids",K1
http://k/1
"#;
    let catalog = parse_m3u(data);
    let ids: Vec<&str> = catalog.categories.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["News", "Music", "Kids"]);
    assert_eq!(catalog.categories[2].icon, "fas fa-child");
}

#[test]
fn test_never_panics_on_garbage() {
    let data = "#EXTINF:\n#EXTINF:,\n#EXTINF:-1 tvg-name=\"unterminated,Title\nhttp://x\n\u{0}\u{feff}#EXTINF\n,,,\n\"\"\n";
    let catalog = parse_m3u(data);
    assert_eq!(catalog.total_channels, catalog.channels.len());
    assert!(catalog.channels.iter().all(|c| !c.url.is_empty() && !c.category.is_empty()));
}
