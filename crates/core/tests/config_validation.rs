use grotto::{
    ChunkConfig, GenError, GridGenerator, MeshMode, TileConfig, World,
    WorldConfig,
};
use validator::ValidationErrors;

/// Get the sorted names of all fields that failed validation
fn error_fields(err: anyhow::Error) -> Vec<&'static str> {
    let validation_errors = err.downcast::<ValidationErrors>().unwrap();
    let mut error_fields = validation_errors
        .errors()
        .keys()
        .copied()
        .collect::<Vec<&str>>();
    error_fields.sort_unstable();
    error_fields
}

#[test]
fn test_tile_config_validation() {
    let config = WorldConfig {
        seed: 0.into(),
        mesh_mode: MeshMode::Independent,
        tile: TileConfig {
            tile_width: 0.0,  // invalid
            tile_height: 2.0, // valid
            tile_ratio: 1.0,  // invalid (open range)
            bump_range: -0.5, // invalid
        },
        chunks: vec![ChunkConfig::default()],
    };

    // This is a bit of a lazy check but it works well enough
    let err = World::generate(config).unwrap_err();
    let validation_errors = err.downcast::<ValidationErrors>().unwrap();
    let tile_errors = match validation_errors.errors().get("tile") {
        Some(validator::ValidationErrorsKind::Struct(errors)) => errors,
        other => panic!("expected struct errors for tile, got {:?}", other),
    };
    let mut fields = tile_errors.errors().keys().copied().collect::<Vec<_>>();
    fields.sort_unstable();
    assert_eq!(
        fields,
        vec!["bump_range", "tile_ratio", "tile_width"],
        "incorrect validation errors in {:#?}",
        tile_errors
    );
}

/// Non-finite values are caught up front, rather than blowing up halfway
/// through meshing
#[test]
fn test_tile_config_not_finite() {
    let config = WorldConfig {
        seed: 0.into(),
        mesh_mode: MeshMode::Independent,
        tile: TileConfig {
            tile_width: f32::NAN,       // invalid
            tile_height: f32::INFINITY, // invalid
            tile_ratio: 0.4,            // valid
            bump_range: f32::INFINITY,  // invalid
        },
        chunks: vec![ChunkConfig::default()],
    };

    let err = World::generate(config).unwrap_err();
    let validation_errors = err.downcast::<ValidationErrors>().unwrap();
    let tile_errors = match validation_errors.errors().get("tile") {
        Some(validator::ValidationErrorsKind::Struct(errors)) => errors,
        other => panic!("expected struct errors for tile, got {:?}", other),
    };
    let mut fields = tile_errors.errors().keys().copied().collect::<Vec<_>>();
    fields.sort_unstable();
    assert_eq!(
        fields,
        vec!["bump_range", "tile_height", "tile_width"],
        "incorrect validation errors in {:#?}",
        tile_errors
    );
}

#[test]
fn test_chunk_config_validation() {
    let config = WorldConfig {
        seed: 0.into(),
        chunks: vec![
            ChunkConfig::default(), // valid
            ChunkConfig {
                anchor: [0.0; 3],
                width: 0,     // invalid
                height: 5000, // invalid
                passes: 1001, // invalid
            },
        ],
        ..Default::default()
    };

    let err = World::generate(config).unwrap_err();
    // The failing chunk is named in the context
    assert_eq!(err.to_string(), "invalid config for chunk 1");
    assert_eq!(error_fields(err), vec!["height", "passes", "width"]);
}

/// Typed errors from the generation stages come through unchanged
#[test]
fn test_gen_error() {
    let err = GridGenerator::new(0, 10, 1).unwrap_err();
    assert_eq!(
        err,
        GenError::InvalidArgument {
            name: "width",
            message: "must be positive".into()
        }
    );
    assert_eq!(err.to_string(), "invalid argument `width`: must be positive");

    let err = anyhow::Error::from(err).context("outer");
    assert!(matches!(
        err.downcast_ref::<GenError>(),
        Some(GenError::InvalidArgument { name: "width", .. })
    ));
}
