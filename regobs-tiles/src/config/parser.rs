//! INI parsing: `Ini` → `ConfigFile`.
//!
//! The single place where INI key names map to struct fields.

use std::collections::HashSet;
use std::path::PathBuf;
use std::str::FromStr;

use ini::{Ini, Properties};

use crate::coord::{LatLngBounds, MAX_ZOOM};
use crate::fallback::OfflineLookupPolicy;
use crate::provider::UrlTemplate;
use crate::save_queue::TileImageFormat;

use super::file::ConfigFileError;
use super::settings::{ConfigFile, LayerSettings, StoreKind};
use super::size::parse_size;

/// Prefix of per-layer section names.
pub const LAYER_SECTION_PREFIX: &str = "layer.";

/// Parse an `Ini` into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays the values found. When
/// the file has at least one `[layer.*]` section the default layer is
/// replaced by the configured ones.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [tiles]
    if let Some(section) = ini.section(Some("tiles")) {
        if let Some(v) = section.get("tile_size") {
            config.tiles.tile_size = parse_number(v, "tiles", "tile_size")?;
            if config.tiles.tile_size == 0 {
                return Err(invalid("tiles", "tile_size", v, "must be greater than zero"));
            }
        }
        if let Some(v) = section.get("edge_buffer_tiles") {
            config.tiles.edge_buffer_tiles = parse_number(v, "tiles", "edge_buffer_tiles")?;
        }
        if let Some(v) = section.get("buffer_offline") {
            config.tiles.buffer_offline = parse_bool(v, "tiles", "buffer_offline")?;
        }
        if let Some(v) = section.get("offline_lookup") {
            config.tiles.offline_lookup = v
                .parse::<OfflineLookupPolicy>()
                .map_err(|_| invalid("tiles", "offline_lookup", v, "must be 'once_per_tile' or 'per_ancestor'"))?;
        }
        if let Some(v) = section.get("persist_ancestor_tiles") {
            config.tiles.persist_ancestor_tiles = parse_bool(v, "tiles", "persist_ancestor_tiles")?;
        }
        if let Some(v) = section.get("image_format") {
            config.tiles.image_format = v
                .parse::<TileImageFormat>()
                .map_err(|_| invalid("tiles", "image_format", v, "must be 'png' or 'jpeg'"))?;
        }
    }

    // [cache]
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.cache.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("store") {
            config.cache.store = match v.trim().to_lowercase().as_str() {
                "disk" => StoreKind::Disk,
                "memory" => StoreKind::Memory,
                _ => return Err(invalid("cache", "store", v, "must be 'disk' or 'memory'")),
            };
        }
        if let Some(v) = section.get("memory_size") {
            config.cache.memory_size = parse_size(v).map_err(|_| {
                invalid("cache", "memory_size", v, "expected format like '256MB', '1GB', or '512KB'")
            })?;
        }
        if let Some(v) = section.get("recency_capacity") {
            config.cache.recency_capacity = parse_number(v, "cache", "recency_capacity")?;
            if config.cache.recency_capacity == 0 {
                return Err(invalid("cache", "recency_capacity", v, "must be greater than zero"));
            }
        }
        if let Some(v) = section.get("save_throttle_ms") {
            config.cache.save_throttle_ms = parse_number(v, "cache", "save_throttle_ms")?;
        }
        if let Some(v) = section.get("save_batch_size") {
            config.cache.save_batch_size = parse_number(v, "cache", "save_batch_size")?;
            if config.cache.save_batch_size == 0 {
                return Err(invalid("cache", "save_batch_size", v, "must be greater than zero"));
            }
        }
    }

    // [download]
    if let Some(section) = ini.section(Some("download")) {
        if let Some(v) = section.get("timeout") {
            config.download.timeout = parse_number(v, "download", "timeout")?;
        }
    }

    // [logging]
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = v.to_string();
            }
        }
    }

    // [layer.<name>]
    let mut layers = Vec::new();
    let mut seen = HashSet::new();
    for (name, section) in ini.iter() {
        let Some(layer_name) = name.and_then(|n| n.strip_prefix(LAYER_SECTION_PREFIX)) else {
            continue;
        };
        let section_name = format!("{}{}", LAYER_SECTION_PREFIX, layer_name);
        let layer_name = layer_name.trim();
        if layer_name.is_empty() {
            return Err(invalid(&section_name, "name", layer_name, "layer name must not be empty"));
        }
        if !seen.insert(layer_name.to_string()) {
            return Err(invalid(&section_name, "name", layer_name, "layer is defined more than once"));
        }
        layers.push(parse_layer(layer_name, &section_name, section)?);
    }
    if !layers.is_empty() {
        config.layers = layers;
    }

    Ok(config)
}

fn parse_layer(name: &str, section_name: &str, section: &Properties) -> Result<LayerSettings, ConfigFileError> {
    let url = section
        .get("url")
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| invalid(section_name, "url", "", "a URL template is required"))?;
    UrlTemplate::parse(url).map_err(|e| invalid(section_name, "url", url, &e.to_string()))?;

    let mut layer = LayerSettings::new(name, url);

    if let Some(v) = section.get("subdomains") {
        let subdomains: Vec<String> = v
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        layer.subdomains = Some(subdomains);
    }
    if let Some(v) = section.get("min_zoom") {
        layer.min_zoom = parse_zoom(v, section_name, "min_zoom")?;
    }
    if let Some(v) = section.get("max_zoom") {
        layer.max_zoom = parse_zoom(v, section_name, "max_zoom")?;
    }
    if layer.min_zoom > layer.max_zoom {
        return Err(invalid(
            section_name,
            "min_zoom",
            &layer.min_zoom.to_string(),
            "must not exceed max_zoom",
        ));
    }
    if let Some(v) = section.get("tms") {
        layer.tms = parse_bool(v, section_name, "tms")?;
    }
    if let Some(v) = section.get("retina") {
        layer.retina = parse_bool(v, section_name, "retina")?;
    }
    if let Some(v) = section.get("bounds") {
        layer.bounds = Some(parse_bounds(v, section_name)?);
    }
    if let Some(v) = section.get("exclusion") {
        let v = v.trim();
        if !v.is_empty() {
            layer.exclusion = Some(expand_tilde(v));
        }
    }

    Ok(layer)
}

/// `south,west,north,east` in degrees.
fn parse_bounds(value: &str, section: &str) -> Result<LatLngBounds, ConfigFileError> {
    let parts: Vec<f64> = value
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|_| invalid(section, "bounds", value, "expected 'south,west,north,east' in degrees"))?;

    match parts.as_slice() {
        &[south, west, north, east] if south <= north && west <= east => {
            Ok(LatLngBounds::new(south, west, north, east))
        }
        _ => Err(invalid(section, "bounds", value, "expected 'south,west,north,east' in degrees")),
    }
}

fn parse_zoom(value: &str, section: &str, key: &str) -> Result<u8, ConfigFileError> {
    let zoom: u8 = parse_number(value, section, key)?;
    if zoom > MAX_ZOOM {
        return Err(invalid(section, key, value, &format!("must be at most {}", MAX_ZOOM)));
    }
    Ok(zoom)
}

fn parse_number<T: FromStr>(value: &str, section: &str, key: &str) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, "must be a non-negative integer"))
}

fn parse_bool(value: &str, section: &str, key: &str) -> Result<bool, ConfigFileError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(section, key, value, "must be true or false")),
    }
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<ConfigFile, ConfigFileError> {
        let ini = Ini::load_from_str(text).unwrap();
        parse_ini(&ini)
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.layers.len(), 1);
        assert_eq!(config.layers[0].name, "topo");
    }

    #[test]
    fn test_tiles_section() {
        let config = parse(
            "[tiles]\ntile_size = 512\nedge_buffer_tiles = 2\nbuffer_offline = false\noffline_lookup = per_ancestor\npersist_ancestor_tiles = no\nimage_format = image/jpeg\n",
        )
        .unwrap();
        assert_eq!(config.tiles.tile_size, 512);
        assert_eq!(config.tiles.edge_buffer_tiles, 2);
        assert!(!config.tiles.buffer_offline);
        assert_eq!(config.tiles.offline_lookup, OfflineLookupPolicy::PerAncestor);
        assert!(!config.tiles.persist_ancestor_tiles);
        assert_eq!(config.tiles.image_format, TileImageFormat::Jpeg);
    }

    #[test]
    fn test_cache_section() {
        let config = parse(
            "[cache]\ndirectory = /tmp/tiles\nstore = memory\nmemory_size = 64MB\nrecency_capacity = 500\nsave_throttle_ms = 10\nsave_batch_size = 8\n",
        )
        .unwrap();
        assert_eq!(config.cache.directory, PathBuf::from("/tmp/tiles"));
        assert_eq!(config.cache.store, StoreKind::Memory);
        assert_eq!(config.cache.memory_size, 64 << 20);
        assert_eq!(config.cache.recency_capacity, 500);
        assert_eq!(config.cache.save_throttle_ms, 10);
        assert_eq!(config.cache.save_batch_size, 8);
    }

    #[test]
    fn test_layers_replace_default() {
        let config = parse(
            r#"
[layer.steepness]
url = https://gis3.nve.no/arcgis/rest/services/wmts/Bratthet/MapServer/tile/{z}/{y}/{x}
min_zoom = 5
max_zoom = 17
bounds = 57.136,-0.176,81.361,36.035

[layer.topo]
url = https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png
subdomains = a, b
exclusion = /etc/regobs/svalbard.geojson
"#,
        )
        .unwrap();

        assert_eq!(config.layers.len(), 2);
        let steepness = config.layer("steepness").unwrap();
        assert_eq!((steepness.min_zoom, steepness.max_zoom), (5, 17));
        assert!(steepness.bounds.is_some());

        let topo = config.layer("topo").unwrap();
        assert_eq!(topo.subdomains, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(topo.exclusion, Some(PathBuf::from("/etc/regobs/svalbard.geojson")));
    }

    #[test]
    fn test_invalid_values() {
        let err = parse("[cache]\nstore = sqlite\n").unwrap_err();
        assert!(matches!(err, ConfigFileError::InvalidValue { ref key, .. } if key == "store"));

        assert!(parse("[tiles]\ntile_size = 0\n").is_err());
        assert!(parse("[tiles]\nbuffer_offline = maybe\n").is_err());
        assert!(parse("[tiles]\noffline_lookup = always\n").is_err());
        assert!(parse("[tiles]\nimage_format = webp\n").is_err());
        assert!(parse("[cache]\nmemory_size = lots\n").is_err());
        assert!(parse("[download]\ntimeout = soon\n").is_err());
    }

    #[test]
    fn test_invalid_layers() {
        assert!(parse("[layer.a]\nmin_zoom = 3\n").is_err());
        assert!(parse("[layer.a]\nurl = https://t/{z}/{x}/{y}?k={key}\n").is_err());
        assert!(parse("[layer.a]\nurl = https://t/{z}/{x}/{y}\nmax_zoom = 30\n").is_err());
        assert!(parse("[layer.a]\nurl = https://t/{z}/{x}/{y}\nmin_zoom = 9\nmax_zoom = 4\n").is_err());
        assert!(parse("[layer.a]\nurl = https://t/{z}/{x}/{y}\nbounds = 1,2,3\n").is_err());
        assert!(parse("[layer. ]\nurl = https://t/{z}/{x}/{y}\n").is_err());
    }

    #[test]
    fn test_expand_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/tiles"), home.join("tiles"));
        }
        assert_eq!(expand_tilde("/abs/tiles"), PathBuf::from("/abs/tiles"));
    }
}
