use anyhow::Result;
use apipub_core::{Rendered, Substitutions, TemplateSource};
use apipub_server::AppConfig;

use crate::cli::RenderArgs;
use crate::commands::invoke::read_event;
use crate::output::print_warning;

pub async fn run(cfg: &AppConfig, args: &RenderArgs) -> Result<()> {
    let rendered = render_template(cfg, args).await?;
    print!("{}", rendered.text);
    for key in &rendered.missing {
        print_warning(&format!("No value for placeholder {key}"));
    }
    Ok(())
}

pub async fn render_template(cfg: &AppConfig, args: &RenderArgs) -> Result<Rendered> {
    let path = args
        .template
        .clone()
        .unwrap_or_else(|| cfg.template.path.clone());
    let template = TemplateSource::new(path).load().await?;

    let mut substitutions = match &args.event {
        Some(event) => {
            let request = read_event(event).await?;
            Substitutions::for_properties(&request.resource_properties, &cfg.control_plane.region)
        }
        None => Substitutions::new(),
    };
    for (key, value) in &args.set {
        substitutions.insert(key.as_str(), value.as_str());
    }

    Ok(apipub_core::render(&template, &substitutions))
}
