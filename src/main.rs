use std::{env, error::Error, path::Path, process::ExitCode};

use dose_gamma::{
    DoseGrid, DoseLoader, DoseLoaderError, GammaFieldAggregator, GammaParameters, PixelSpacing,
};

const USAGE: &str =
    "usage: dose-gamma <planned> <measured> [dose_%] [distance_mm] [neighborhood] [output.png]";

fn load(path: &Path) -> Result<DoseGrid, DoseLoaderError> {
    let is_dicom = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("dcm"));
    if is_dicom {
        return DoseLoader::load_from_file(path);
    }
    // Plain rasters carry no calibration.
    log::warn!("{} has no pixel spacing, assuming 1 mm", path.display());
    DoseLoader::load_from_image(path, PixelSpacing::new(1.0, 1.0)?)
}

fn parse_params(args: &[String]) -> Result<GammaParameters, Box<dyn Error>> {
    let defaults = GammaParameters::default();
    let params = GammaParameters::new(
        args.first().map_or(Ok(defaults.dose_criterion_percent), |a| a.parse())?,
        args.get(1).map_or(Ok(defaults.distance_criterion_mm), |a| a.parse())?,
        args.get(2).map_or(Ok(defaults.neighborhood_size), |a| a.parse())?,
    )?;
    Ok(params)
}

fn run(args: &[String]) -> Result<(), Box<dyn Error>> {
    let [planned, measured, rest @ ..] = args else {
        return Err(USAGE.into());
    };
    let params = parse_params(rest)?;
    let output = rest.get(3).map_or("gamma.png", String::as_str);

    let planned = load(Path::new(planned))?;
    let measured = load(Path::new(measured))?;
    for (name, grid) in [("planned", &planned), ("measured", &measured)] {
        let spacing = grid.spacing();
        log::info!(
            "{name}: {}x{} px, pixel {} x {} mm",
            grid.width(),
            grid.height(),
            spacing.width_mm,
            spacing.height_mm
        );
    }

    let analysis = GammaFieldAggregator::default().run(&planned, &measured, &params)?;
    match analysis.statistics() {
        Ok(stats) => {
            log::info!("mean gamma: {}", stats.mean);
            log::info!("max gamma: {}", stats.max);
            log::info!("min gamma: {}", stats.min);
            log::info!("gamma std dev: {}", stats.std_dev);
            log::info!("pixels within criteria: {}%", stats.pass_rate_percent);
        }
        Err(e) => log::warn!("{e}"),
    }

    if let Some(image) = analysis.field.to_image() {
        image.save(output)?;
        log::info!("gamma map written to {output}");
    }
    Ok(())
}

fn main() -> ExitCode {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()
        .ok();

    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
