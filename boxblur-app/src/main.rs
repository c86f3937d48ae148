use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = boxblur_app::load_config(".").and_then(|config| boxblur_app::run(&config));
    match result {
        Ok(elapsed) => {
            println!("{}", boxblur_app::format_elapsed(elapsed));
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
