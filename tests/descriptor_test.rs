use festive_ngin::{
    data_structures::channels::{Channels, MaterialChannel},
    resources::{
        descriptor::{DescriptorError, load_descriptor, parse},
        texture::{AssetUrl, resolve_url},
    },
};

#[test]
fn parses_all_channels() {
    let descriptor = parse(
        r#"{
            "map": "albedo.jpg",
            "normalMap": "normal.jpg",
            "roughnessMap": "rough.jpg",
            "metalnessMap": "metal.jpg",
            "aoMap": "ao.jpg",
            "emissiveMap": "https://example.com/emissive.jpg"
        }"#,
    )
    .unwrap();
    assert_eq!(descriptor.sources.len(), 6);
    assert_eq!(descriptor.source(MaterialChannel::Color), Some("albedo.jpg"));
    assert_eq!(
        descriptor.source(MaterialChannel::Emissive),
        Some("https://example.com/emissive.jpg")
    );
}

#[test]
fn subset_only_names_given_channels() {
    let descriptor = parse(r#"{ "normalMap": "n.png", "unknown": 3 }"#).unwrap();
    let channels: Vec<_> = descriptor.sources.iter().map(|(c, _)| c).collect();
    assert_eq!(channels, vec![MaterialChannel::Normal]);
}

#[test]
fn bad_entries_are_skipped() {
    let descriptor = parse(r#"{ "map": 4, "aoMap": "", "normalMap": null, "emissiveMap": " e.png " }"#)
        .unwrap();
    assert_eq!(descriptor.sources.len(), 1);
    assert_eq!(descriptor.source(MaterialChannel::Emissive), Some("e.png"));
}

#[test]
fn malformed_descriptors_are_errors() {
    assert!(matches!(parse(""), Err(DescriptorError::Empty)));
    assert!(matches!(parse("  \n"), Err(DescriptorError::Empty)));
    assert!(matches!(parse("{ not json"), Err(DescriptorError::Json(_))));
    assert!(matches!(
        parse(r#"["map"]"#),
        Err(DescriptorError::NotAnObject("an array"))
    ));
    assert!(parse("{}").unwrap().is_empty());
}

#[test]
fn overlay_replaces_only_given_channels() {
    let mut material: Channels<&str> = MaterialChannel::ALL
        .into_iter()
        .map(|channel| (channel, "default"))
        .collect();
    let mut update = Channels::new();
    update.set(MaterialChannel::Roughness, "rough");
    update.set(MaterialChannel::Emissive, "glow");

    let written = material.overlay(&update);
    assert_eq!(
        written,
        vec![MaterialChannel::Roughness, MaterialChannel::Emissive]
    );
    assert_eq!(material.get(MaterialChannel::Roughness), Some(&"rough"));
    assert_eq!(material.get(MaterialChannel::Color), Some(&"default"));
    assert_eq!(material.len(), 6);
}

#[test]
fn channel_keys_round_trip() {
    for channel in MaterialChannel::ALL {
        assert_eq!(MaterialChannel::from_key(channel.key()), Some(channel));
    }
    assert_eq!(MaterialChannel::from_key("bumpMap"), None);
    assert!(MaterialChannel::Color.is_color());
    assert!(MaterialChannel::Emissive.is_color());
    assert!(!MaterialChannel::Normal.is_color());
}

#[test]
fn urls_are_remote_or_below_the_asset_root() {
    assert_eq!(
        resolve_url(" https://example.com/a.hdr "),
        AssetUrl::Remote("https://example.com/a.hdr".to_string())
    );
    assert_eq!(resolve_url("/7.json"), AssetUrl::Local("7.json".to_string()));
    assert_eq!(
        resolve_url("textures/a.png"),
        AssetUrl::Local("textures/a.png".to_string())
    );
}

#[tokio::test]
async fn missing_descriptor_is_unavailable() {
    match load_descriptor("no-such-descriptor.json").await {
        Err(DescriptorError::Unavailable { path, .. }) => {
            assert_eq!(path, "no-such-descriptor.json")
        }
        other => panic!("expected an unavailable descriptor, got {:?}", other),
    }
}

#[tokio::test]
async fn shipped_descriptor_assigns_every_channel() {
    let descriptor = load_descriptor("7.json").await.unwrap();
    assert_eq!(descriptor.sources.len(), 6);
    assert_eq!(
        descriptor.source(MaterialChannel::Roughness),
        descriptor.source(MaterialChannel::Metalness)
    );
}
