use constants::render_settings::{
    END_OF_LIST, FOURIER_TERMS, MAX_FRAGMENTS_PER_PIXEL, PIXEL_TILE_SIZE, UNWRITTEN_ALPHA_BITS,
    WORKGROUP_SIZE,
};

const TYPES: &str = include_str!("../assets/shaders/opacity_types.wgsl");

const LINEAR_KERNELS: [(&str, &str); 3] = [
    ("fill_u32", include_str!("../assets/shaders/fill_u32.wgsl")),
    ("smooth_alpha", include_str!("../assets/shaders/smooth_alpha.wgsl")),
    ("fade_to_vertex", include_str!("../assets/shaders/fade_to_vertex.wgsl")),
];

const PIXEL_KERNELS: [(&str, &str); 2] = [
    ("solve_low_res", include_str!("../assets/shaders/solve_low_res.wgsl")),
    ("fourier_solve", include_str!("../assets/shaders/fourier_solve.wgsl")),
];

fn declares(source: &str, declaration: String) -> bool {
    source.lines().any(|line| line.trim() == declaration)
}

#[test]
fn shared_constants_match_the_host() {
    assert!(declares(
        TYPES,
        format!("const END_OF_LIST: u32 = {END_OF_LIST:#x}u;")
    ));
    assert!(declares(
        TYPES,
        format!("const UNWRITTEN_ALPHA: u32 = {UNWRITTEN_ALPHA_BITS:#x}u;")
    ));
    assert!(declares(
        TYPES,
        format!("const MAX_FRAGMENTS: u32 = {MAX_FRAGMENTS_PER_PIXEL}u;")
    ));
    assert!(declares(
        TYPES,
        format!("const FOURIER_TERMS: u32 = {FOURIER_TERMS}u;")
    ));
}

#[test]
fn workgroup_sizes_match_the_dispatch_math() {
    for (name, source) in LINEAR_KERNELS {
        assert!(
            source.contains(&format!("@workgroup_size({WORKGROUP_SIZE})")),
            "{name}"
        );
    }
    for (name, source) in PIXEL_KERNELS {
        assert!(
            source.contains(&format!(
                "@workgroup_size({PIXEL_TILE_SIZE}, {PIXEL_TILE_SIZE}, 1)"
            )),
            "{name}"
        );
    }
}

#[test]
fn kernels_import_the_shared_types() {
    for (name, source) in LINEAR_KERNELS.iter().chain(PIXEL_KERNELS.iter()) {
        if *name == "fill_u32" {
            continue;
        }
        assert!(source.contains("#import line_render::opacity_types"), "{name}");
    }
}
