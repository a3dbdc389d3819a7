//! Top-level administrative regions (sido) and their reference centers.
//!
//! Region names are the Korean short names the AirKorea and living-weather
//! APIs accept verbatim as query parameters.

/// Reference center of a region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionCenter {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

const fn center(name: &'static str, lat: f64, lng: f64) -> RegionCenter {
    RegionCenter { name, lat, lng }
}

/// All 17 regions, in lookup order. Order matters for tie-breaking.
pub const REGION_CENTERS: [RegionCenter; 17] = [
    center("서울", 37.5665, 126.978),
    center("부산", 35.1796, 129.0756),
    center("대구", 35.8714, 128.6014),
    center("인천", 37.4563, 126.7052),
    center("광주", 35.1595, 126.8526),
    center("대전", 36.3504, 127.3845),
    center("울산", 35.5384, 129.3114),
    center("세종", 36.48, 127.289),
    center("경기", 37.275, 127.0094),
    center("강원", 37.8228, 128.1555),
    center("충북", 36.6357, 127.4913),
    center("충남", 36.5184, 126.8),
    center("전북", 35.7175, 127.153),
    center("전남", 34.8679, 126.991),
    center("경북", 36.4919, 128.8889),
    center("경남", 35.4606, 128.2132),
    center("제주", 33.4996, 126.5312),
];

/// Living-weather-index area codes (`areaNo`) per region.
const UV_AREA_CODES: [(&str, &str); 17] = [
    ("서울", "1100000000"),
    ("부산", "2600000000"),
    ("대구", "2200000000"),
    ("인천", "2800000000"),
    ("광주", "2900000000"),
    ("대전", "3000000000"),
    ("울산", "3100000000"),
    ("세종", "3611000000"),
    ("경기", "4100000000"),
    ("강원", "4200000000"),
    ("충북", "4300000000"),
    ("충남", "4400000000"),
    ("전북", "4500000000"),
    ("전남", "4600000000"),
    ("경북", "4700000000"),
    ("경남", "4800000000"),
    ("제주", "5000000000"),
];

/// Name of the region whose center is closest to `(lat, lng)`.
///
/// Distance is squared Euclidean in degree space. The first region with the
/// minimal distance wins; if nothing compares (NaN input) the first region
/// in the table is returned.
pub fn nearest_region(lat: f64, lng: f64) -> &'static str {
    nearest_in(&REGION_CENTERS, lat, lng)
}

fn nearest_in(regions: &[RegionCenter], lat: f64, lng: f64) -> &'static str {
    let mut min = f64::INFINITY;
    let mut nearest = regions[0].name;
    for region in regions {
        let d = (region.lat - lat).powi(2) + (region.lng - lng).powi(2);
        if d < min {
            min = d;
            nearest = region.name;
        }
    }
    nearest
}

/// UV-index area code for a region name, if one is known.
pub fn uv_area_code(region: &str) -> Option<&'static str> {
    UV_AREA_CODES
        .iter()
        .find(|(name, _)| *name == region)
        .map(|(_, code)| *code)
}
