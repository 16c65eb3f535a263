use console::Style;
use kcor_core::pipeline::config::{StackMethod, StreamConfig};
use kcor_core::pipeline::{BatchSummary, ObservationOutput};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
    error: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
            error: Style::new().red().bold(),
        }
    }
}

pub fn print_config_summary(config: &StreamConfig, observations: usize) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("KCor Stream Processing"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(22)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Stream"),
        s.path.apply_to(config.stream_root.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output_root.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Observations"),
        s.value.apply_to(observations)
    );
    let cores = config
        .cores
        .map_or_else(|| "all".to_string(), |n| n.to_string());
    println!("  {:<14}{}", s.label.apply_to("Cores"), s.value.apply_to(cores));
    println!();

    let g = &config.geometry;
    println!("  {}", s.header.apply_to("Geometry"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Sensor"),
        s.value.apply_to(format!("{}x{}", g.width, g.height))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Cameras"),
        s.value.apply_to(format!("{} x {} states", g.cameras, g.states))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("ADC"),
        s.value.apply_to(format!("{} channels", g.adc_channels))
    );
    println!();

    println!("  {}", s.header.apply_to("Stacking"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Method"),
        s.method.apply_to(config.stacking.method)
    );
    if config.stacking.method == StackMethod::AerosolFilter {
        let f = &config.filter;
        println!(
            "    {:<12}{}",
            s.label.apply_to("K"),
            s.value.apply_to(format!("{:.4}", f.noise_scale))
        );
        println!("    {:<12}{}", s.label.apply_to("G"), s.value.apply_to(f.gain));
        println!(
            "    {:<12}{}",
            s.label.apply_to("Retention"),
            s.value.apply_to(format!("{:.0}%", f.retention * 100.0))
        );
    }
    println!();

    if config.luts.camera_ids.is_empty() {
        println!(
            "  {:<14}{}",
            s.header.apply_to("LUTs"),
            s.disabled.apply_to("identity")
        );
    } else {
        println!("  {}", s.header.apply_to("LUTs"));
        println!(
            "    {:<12}{}",
            s.label.apply_to("Root"),
            s.path.apply_to(config.luts.root.display())
        );
        println!(
            "    {:<12}{}",
            s.label.apply_to("Identifier"),
            s.value.apply_to(&config.luts.identifier)
        );
        println!(
            "    {:<12}{}",
            s.label.apply_to("Cameras"),
            s.value.apply_to(config.luts.camera_ids.join(", "))
        );
    }
    println!();
}

pub fn print_observation_summary(output: &ObservationOutput) {
    let s = Styles::new();
    let pixels = output.cube.len();

    println!("  {}", s.header.apply_to(&output.timestamp));
    println!("    {:<12}{}", s.label.apply_to("Numsum"), s.value.apply_to(output.numsum));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Fallback"),
        s.value.apply_to(format!(
            "{} / {} pixels",
            output.fallback_pixels, pixels
        ))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Filter"),
        s.value.apply_to(format!("{:.1} ms", output.filter_ms))
    );
    if let Some(ref corona) = output.corona {
        let max = corona.data().iter().copied().fold(0.0f32, f32::max);
        println!(
            "    {:<12}{}",
            s.label.apply_to("Corona max"),
            s.value.apply_to(format!("{max:.1}"))
        );
    }
    println!();
}

pub fn print_batch_summary(summary: &BatchSummary) {
    let s = Styles::new();

    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Written"),
        s.value.apply_to(summary.written.len())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Skipped"),
        s.value.apply_to(summary.skipped.len())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Failed"),
        s.value.apply_to(summary.failed.len())
    );
    for (timestamp, err) in &summary.failed {
        println!("    {} {}", s.error.apply_to(timestamp), err);
    }
    println!();
}
