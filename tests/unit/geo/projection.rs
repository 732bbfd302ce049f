use super::*;

#[test]
fn lat_lon_roundtrip_within_tolerance() {
    let mut lat = -84.9;
    while lat < 85.0 {
        let back = y_to_lat(lat_to_y(lat));
        assert!((back - lat).abs() < 1e-9, "lat {lat} -> {back}");
        lat += 0.7;
    }
    let mut lon = -180.0;
    while lon <= 180.0 {
        let back = x_to_lon(lon_to_x(lon));
        assert!((back - lon).abs() < 1e-9, "lon {lon} -> {back}");
        lon += 1.3;
    }
}

#[test]
fn equator_and_greenwich_map_to_origin() {
    assert_eq!(lon_to_x(0.0), 0.0);
    assert!(lat_to_y(0.0).abs() < 1e-12);
    assert!((lon_to_x(180.0) - PI).abs() < 1e-12);
}

#[test]
fn tile_indices_match_slippy_map_convention() {
    // Zoom 0 is a single tile.
    assert_eq!(lon_to_tile_x(13.4, 0), 0);
    assert_eq!(lat_to_tile_y(52.5, 0), 0);

    // Berlin at zoom 10 (well known tile 550/335).
    assert_eq!(lon_to_tile_x(13.4050, 10), 550);
    assert_eq!(lat_to_tile_y(52.5200, 10), 335);
}

#[test]
fn tile_origin_inverts_tile_index() {
    for zoom in [0u32, 3, 12] {
        for tile in [0i64, 1, 5] {
            if tile >= 1 << zoom {
                continue;
            }
            let x = tile_x_to_x(tile, zoom);
            assert_eq!(x_to_tile_x(x + 1e-9, zoom), tile);
            let y = tile_y_to_y(tile, zoom);
            assert_eq!(y_to_tile_y(y - 1e-9, zoom), tile);
        }
    }
}

#[test]
fn haversine_one_degree_of_latitude() {
    let d = haversine_distance_m(0.0, 0.0, 1.0, 0.0);
    assert!((d - 111_195.0).abs() < 50.0, "{d}");
    assert_eq!(haversine_distance_m(10.0, 10.0, 10.0, 10.0), 0.0);
}
