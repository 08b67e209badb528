use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use focal_gateway::api::types::{BearerToken, EquipmentId, ManufacturerId};
use focal_gateway::api::{PublicApi, SiteApi};
use focal_gateway::forms::draft::parse_number;
use focal_gateway::forms::{
    Attachment, CameraSettings, CompositeForm, EditInput, EquipmentInput, LensSpecs, Navigator, PhotoInput,
    SubmitError,
};
use focal_gateway::resilience::{CancellationSource, TimerCancellation};

#[derive(Parser)]
#[command(name = "focal-cli")]
#[command(about = "Submit photos and browse the equipment catalog", long_about = None)]
struct Cli {
    /// Gateway serving the page data routes
    #[arg(short, long, default_value = "http://localhost:3000")]
    site: String,

    /// Per-request timeout
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the equipment catalog and accepted file types
    Catalog,
    /// Create a photo and its edits
    Submit(SubmitArgs),
}

#[derive(Args)]
struct SubmitArgs {
    /// Public API base; defaults to the one the gateway advertises
    #[arg(long)]
    api: Option<String>,

    /// Session token (the `token` cookie value)
    #[arg(long)]
    token: String,

    /// Account to post under
    #[arg(long)]
    handle: String,

    #[arg(long, default_value = "")]
    title: String,

    #[arg(long, default_value = "")]
    text: String,

    #[arg(long)]
    raw: Option<PathBuf>,

    #[arg(long)]
    preview: Option<PathBuf>,

    #[command(flatten)]
    settings: SettingsArgs,

    #[command(flatten)]
    equipment: EquipmentArgs,

    /// Edit as `TITLE=SIDECAR_PATH`; repeatable
    #[arg(long = "edit", value_parser = parse_edit)]
    edits: Vec<(String, PathBuf)>,
}

#[derive(Args)]
struct SettingsArgs {
    #[arg(long)]
    aperture: Option<String>,
    #[arg(long)]
    focal_length: Option<String>,
    #[arg(long)]
    iso: Option<String>,
    /// Shutter speed as `1/250` or `2`
    #[arg(long)]
    shutter: Option<String>,
    #[arg(long)]
    flash: bool,
}

#[derive(Args)]
struct EquipmentArgs {
    #[arg(long)]
    camera_id: Option<String>,
    #[arg(long)]
    camera_model: Option<String>,
    #[arg(long)]
    camera_maker_id: Option<String>,
    #[arg(long)]
    camera_maker: Option<String>,
    #[arg(long)]
    lens_id: Option<String>,
    #[arg(long)]
    lens_model: Option<String>,
    #[arg(long)]
    lens_maker_id: Option<String>,
    #[arg(long)]
    lens_maker: Option<String>,
    /// New lens aperture range as `MIN-MAX`
    #[arg(long)]
    lens_apertures: Option<String>,
    /// New lens focal-length range as `MIN-MAX`
    #[arg(long)]
    lens_focal_lengths: Option<String>,
}

fn parse_edit(value: &str) -> Result<(String, PathBuf), String> {
    value
        .split_once('=')
        .map(|(title, path)| (title.to_string(), PathBuf::from(path)))
        .ok_or_else(|| format!("expected TITLE=PATH, got `{}`", value))
}

fn parse_range(value: Option<&str>) -> (Option<f64>, Option<f64>) {
    match value.and_then(|v| v.split_once('-')) {
        Some((min, max)) => (parse_number(min), parse_number(max)),
        None => (None, None),
    }
}

fn parse_shutter(value: Option<&str>) -> (Option<u32>, Option<u32>) {
    match value {
        Some(v) => match v.split_once('/') {
            Some((num, den)) => (parse_number(num), parse_number(den)),
            None => (parse_number(v), Some(1)),
        },
        None => (None, None),
    }
}

/// Prints where the browser would go next.
struct PrintNavigator {
    site: String,
}

impl Navigator for PrintNavigator {
    fn navigate(&self, path: &str) {
        println!("{}{}", self.site.trim_end_matches('/'), path);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let timeout = Duration::from_millis(cli.timeout_ms);
    let cancellation: Arc<dyn CancellationSource> = Arc::new(TimerCancellation::new());
    let site = SiteApi::new(client.clone(), cli.site.clone(), timeout, cancellation.clone());

    match cli.command {
        Commands::Catalog => {
            let catalog = site.fetch_catalog().await?;
            println!("{}", serde_json::to_string_pretty(&catalog)?);
        }
        Commands::Submit(args) => {
            let catalog = site.fetch_catalog().await?;
            let Some(base) = args.api.clone().or(catalog.public_api) else {
                return Err("the gateway did not advertise a public API; pass --api".into());
            };
            let mut form = build_form(&args, catalog.manufacturers).await?;

            let api = PublicApi::new(client, base, timeout, cancellation)
                .with_token(BearerToken::new(args.token.clone()));
            let navigator = PrintNavigator { site: cli.site.clone() };

            match form.submit(&api, &navigator).await {
                Ok(_) => {}
                Err(SubmitError::Invalid(report)) => {
                    for (draft, issues) in &report.failures {
                        for issue in issues {
                            eprintln!("{}: {}", draft, issue);
                        }
                    }
                    return Err("form is incomplete".into());
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}

async fn attachment(path: Option<&PathBuf>) -> std::io::Result<Option<Attachment>> {
    match path {
        Some(path) => Ok(Some(Attachment::read(path).await?)),
        None => Ok(None),
    }
}

fn equipment_inputs(
    id: &Option<String>,
    model: &Option<String>,
    maker_id: &Option<String>,
    maker: &Option<String>,
) -> Vec<EquipmentInput> {
    let mut inputs = Vec::new();
    if let Some(maker_id) = maker_id {
        inputs.push(EquipmentInput::SelectManufacturer(Some(ManufacturerId(maker_id.clone()))));
    } else if let Some(maker) = maker {
        inputs.push(EquipmentInput::TypeManufacturer(maker.clone()));
    }
    if let Some(id) = id {
        inputs.push(EquipmentInput::Select(Some(EquipmentId(id.clone()))));
    } else if let Some(model) = model {
        inputs.push(EquipmentInput::TypeModel(model.clone()));
    }
    inputs
}

async fn build_form(
    args: &SubmitArgs,
    catalog: Vec<focal_gateway::api::types::Manufacturer>,
) -> Result<CompositeForm, Box<dyn std::error::Error>> {
    let mut form = CompositeForm::new(args.handle.clone(), catalog);

    form.update_photo(PhotoInput::Title(args.title.clone()));
    form.update_photo(PhotoInput::Text(args.text.clone()));
    form.update_photo(PhotoInput::RawFile(attachment(args.raw.as_ref()).await?));
    form.update_photo(PhotoInput::PreviewFile(attachment(args.preview.as_ref()).await?));

    let s = &args.settings;
    let (shutter_speed_numerator, shutter_speed_denominator) = parse_shutter(s.shutter.as_deref());
    form.update_photo(PhotoInput::Settings(CameraSettings {
        aperture: s.aperture.as_deref().and_then(parse_number),
        flash: Some(s.flash),
        focal_length: s.focal_length.as_deref().and_then(parse_number),
        iso: s.iso.as_deref().and_then(parse_number),
        shutter_speed_numerator,
        shutter_speed_denominator,
    }));

    let e = &args.equipment;
    for input in equipment_inputs(&e.camera_id, &e.camera_model, &e.camera_maker_id, &e.camera_maker) {
        form.update_photo(PhotoInput::Camera(input));
    }
    for input in equipment_inputs(&e.lens_id, &e.lens_model, &e.lens_maker_id, &e.lens_maker) {
        form.update_photo(PhotoInput::Lens(input));
    }
    let (aperture_min, aperture_max) = parse_range(e.lens_apertures.as_deref());
    let (focal_length_min, focal_length_max) = parse_range(e.lens_focal_lengths.as_deref());
    form.update_photo(PhotoInput::LensSpecs(LensSpecs {
        aperture_min,
        aperture_max,
        focal_length_min,
        focal_length_max,
    }));

    for (title, sidecar) in &args.edits {
        let Some(id) = form.add_edit() else { break };
        form.update_edit(id, EditInput::Title(title.clone()));
        form.update_edit(id, EditInput::SidecarFile(Some(Attachment::read(sidecar).await?)));
    }

    Ok(form)
}
