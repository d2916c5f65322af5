use line_render_engine::engine::core::app_setup::create_app;
use line_render_engine::engine::core::settings::LaunchOptions;
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() > 3 {
        eprintln!("Usage: {} [preset 0|1|2] [settings.json]", args[0]);
        std::process::exit(1);
    }

    let options = LaunchOptions::from_args(&args[1..]);
    let mut app = create_app(&options)?;

    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen_futures::spawn_local(async move {
            app.run();
        });
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        if app.run().is_error() {
            std::process::exit(1);
        }
    }

    Ok(())
}
