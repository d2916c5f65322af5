use bevy::asset::AssetMetaCheck;
use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy::render::camera::ClearColorConfig;
use bevy::window::{PresentMode, WindowResolution};
use bevy_common_assets::json::JsonAssetPlugin;
use constants::line_set::PreparedLineSet;
use constants::render_settings::{
    BACKGROUND_COLOR, CAMERA_FAR, CAMERA_FOV, CAMERA_NEAR, WINDOW_RESOLUTION, WINDOW_TITLE,
};

// Crate engine modules
use crate::engine::camera::viewport_camera::{ViewportCamera, camera_controller};
use crate::engine::core::app_state::{
    AppState, HudText, transition_to_assets_loaded, transition_to_running,
};
use crate::engine::core::settings::{
    ActiveDataset, BaselineSettings, LaunchOptions, SettingsError,
};
use crate::engine::loading::line_set_loader::{
    LineSetLoader, check_line_set_loading, start_loading,
};
use crate::engine::render::extraction::OpacityCamera;
use crate::engine::render::plugin::OpacityOptimizationPlugin;
use crate::engine::systems::fps_tracking::{fps_title_system, hud_text_update_system};
use crate::engine::systems::parameter_controls::parameter_controls;

pub fn create_app(options: &LaunchOptions) -> Result<App, SettingsError> {
    let dataset = options.dataset();
    let settings = options.resolve_settings()?;

    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        // Registers PreparedLineSet as a loadable asset type from *.lines.json files.
        .add_plugins(JsonAssetPlugin::<PreparedLineSet>::new(&["lines.json"]))
        .add_plugins(OpacityOptimizationPlugin);

    // Initialise resources early
    app.insert_resource(ActiveDataset(dataset))
        .insert_resource(BaselineSettings(settings.clone()))
        .insert_resource(settings)
        .insert_resource(ViewportCamera::from_preset(dataset))
        .init_resource::<LineSetLoader>();

    // State-based system scheduling
    app.add_systems(Startup, (setup, start_loading).chain())
        .add_systems(
            Update,
            (check_line_set_loading, transition_to_assets_loaded)
                .chain()
                .run_if(in_state(AppState::Loading)),
        )
        .add_systems(
            Update,
            transition_to_running.run_if(in_state(AppState::AssetsLoaded)),
        )
        .add_systems(
            Update,
            (camera_controller, parameter_controls, fps_title_system)
                .run_if(in_state(AppState::Running)),
        );

    // Add hud_text_update_system only for native builds.
    #[cfg(not(target_arch = "wasm32"))]
    {
        app.add_systems(Update, hud_text_update_system);
    }

    Ok(app)
}

fn spawn_opacity_camera(commands: &mut Commands, viewport_camera: &ViewportCamera) {
    let [r, g, b, _] = BACKGROUND_COLOR;
    commands.spawn((
        Camera3d::default(),
        Camera {
            clear_color: ClearColorConfig::Custom(Color::srgb(r, g, b)),
            ..default()
        },
        Projection::from(PerspectiveProjection {
            fov: CAMERA_FOV,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            ..default()
        }),
        Msaa::Off,
        Tonemapping::None,
        viewport_camera.transform(),
        OpacityCamera,
    ));
}

// Startup system that only handles basic initialisation
fn setup(mut commands: Commands, viewport_camera: Res<ViewportCamera>) {
    spawn_opacity_camera(&mut commands, &viewport_camera);

    #[cfg(not(target_arch = "wasm32"))]
    {
        create_native_overlays(&mut commands);
    }
}

fn create_native_overlays(commands: &mut Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("FPS: "),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::srgb(0.2, 0.2, 0.2)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    right: Val::Px(12.0),
                    ..default()
                },
                HudText,
            ));
        });
}

fn create_window_config() -> Window {
    #[cfg(target_arch = "wasm32")]
    {
        Window {
            title: WINDOW_TITLE.into(),
            canvas: Some("#bevy".into()),
            fit_canvas_to_parent: true,
            prevent_default_event_handling: false,
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        Window {
            title: WINDOW_TITLE.into(),
            resolution: WindowResolution::from(WINDOW_RESOLUTION),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
