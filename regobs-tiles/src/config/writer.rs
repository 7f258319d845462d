//! Serialization of `ConfigFile` into a commented INI string.

use std::fmt::Write;
use std::path::Path;

use super::settings::{ConfigFile, LayerSettings};
use super::size::format_size;

/// Render the configuration as written to `config.ini`.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let mut out = format!(
        r#"[tiles]
; Edge length of a tile in pixels
tile_size = {}
; Extra rows/columns of tiles requested beyond each viewport edge
edge_buffer_tiles = {}
; Save tiles displayed from the network to the offline store
buffer_offline = {}
; When to look in the offline store after a failed load:
;   once_per_tile - only the requested tile
;   per_ancestor  - the requested tile and every ancestor that fails
offline_lookup = {}
; Also save ancestor tiles displayed as fallbacks
persist_ancestor_tiles = {}
; Format of saved tiles: png or jpeg
image_format = {}

[cache]
; Directory of the on-disk offline store
directory = {}
; Offline store backend: disk or memory
store = {}
; Size of the memory store (e.g. 256MB, 1GB)
memory_size = {}
; Number of recently saved tile ids remembered to skip duplicate saves
recency_capacity = {}
; Pause between save batches in milliseconds
save_throttle_ms = {}
; Tiles written per save batch
save_batch_size = {}

[download]
; HTTP timeout in seconds
timeout = {}

[logging]
directory = {}
file = {}
"#,
        config.tiles.tile_size,
        config.tiles.edge_buffer_tiles,
        config.tiles.buffer_offline,
        config.tiles.offline_lookup,
        config.tiles.persist_ancestor_tiles,
        config.tiles.image_format.as_str(),
        path_to_string(&config.cache.directory),
        config.cache.store.as_str(),
        format_size(config.cache.memory_size),
        config.cache.recency_capacity,
        config.cache.save_throttle_ms,
        config.cache.save_batch_size,
        config.download.timeout,
        path_to_string(&config.logging.directory),
        config.logging.file,
    );

    for layer in &config.layers {
        write_layer(&mut out, layer);
    }
    out
}

fn write_layer(out: &mut String, layer: &LayerSettings) {
    let _ = writeln!(out);
    let _ = writeln!(out, "[layer.{}]", layer.name);
    let _ = writeln!(out, "url = {}", layer.url);
    if let Some(subdomains) = &layer.subdomains {
        let _ = writeln!(out, "subdomains = {}", subdomains.join(","));
    }
    let _ = writeln!(out, "min_zoom = {}", layer.min_zoom);
    let _ = writeln!(out, "max_zoom = {}", layer.max_zoom);
    let _ = writeln!(out, "tms = {}", layer.tms);
    let _ = writeln!(out, "retina = {}", layer.retina);
    if let Some(bounds) = &layer.bounds {
        let _ = writeln!(
            out,
            "bounds = {},{},{},{}",
            bounds.south(),
            bounds.west(),
            bounds.north(),
            bounds.east()
        );
    }
    if let Some(exclusion) = &layer.exclusion {
        let _ = writeln!(out, "exclusion = {}", path_to_string(exclusion));
    }
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::LatLngBounds;

    #[test]
    fn test_layer_roundtrip() {
        let mut config = ConfigFile::default();
        let mut layer = LayerSettings::new("weakenedice", "https://gis3.nve.no/arcgis/rest/services/wmts/SvekketIs/MapServer/tile/{z}/{y}/{x}");
        layer.subdomains = Some(vec!["a".to_string(), "b".to_string()]);
        layer.bounds = Some(LatLngBounds::new(57.5, -0.25, 81.5, 36.0));
        layer.exclusion = Some("/data/svalbard.geojson".into());
        config.layers.push(layer);

        let text = to_config_string(&config);
        assert!(text.contains("[layer.weakenedice]"));
        let parsed = ConfigFile::parse(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_contains_every_section() {
        let text = to_config_string(&ConfigFile::default());
        for section in ["[tiles]", "[cache]", "[download]", "[logging]", "[layer.topo]"] {
            assert!(text.contains(section), "missing {}", section);
        }
    }
}
