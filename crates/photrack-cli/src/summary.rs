use console::Style;
use photrack_core::pipeline::config::RunConfig;
use photrack_core::pipeline::RunSummary;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    warn: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            warn: Style::new().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_run_header(config: &RunConfig) {
    let s = Styles::new();
    let p = &config.photometry;

    println!();
    println!("  {}", s.title.apply_to("Photrack Run"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(12)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Frames"),
        s.path.apply_to(config.frames.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Coordinates"),
        s.path.apply_to(config.coordinates.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output.display())
    );
    println!();

    println!("  {}", s.header.apply_to("Photometry"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Search"),
        s.value.apply_to(format!("\u{00b1}{} px", p.tracking.search_offset))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Aperture"),
        s.value.apply_to(format!("r = {} px", p.aperture.radius))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Edges"),
        s.method.apply_to(&p.aperture.method)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Zero-points"),
        s.value.apply_to(format!(
            "flux {} / mag {}",
            p.calibration.flux_zero_point, p.calibration.mag_zero_point
        ))
    );
    println!();
}

pub fn print_run_result(config: &RunConfig, summary: &RunSummary) {
    let s = Styles::new();

    println!();
    println!("  {}", s.header.apply_to("Result"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Frames"),
        s.value.apply_to(summary.frames)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Objects"),
        s.value.apply_to(summary.objects)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Rows"),
        s.value.apply_to(summary.records)
    );

    let lost = format!(
        "{} lost, {} re-acquired (round {})",
        summary.lost_frames, summary.reacquired_frames, summary.hypothesis_round
    );
    if summary.lost_frames > 0 {
        println!("    {:<12}{}", s.label.apply_to("Tracking"), s.warn.apply_to(lost));
    } else {
        println!("    {:<12}{}", s.label.apply_to("Tracking"), s.method.apply_to(lost));
    }

    if summary.undefined_magnitudes > 0 {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Undefined"),
            s.warn.apply_to(format!("{} magnitudes", summary.undefined_magnitudes))
        );
    }
    println!();
    println!("  Table saved to {}", s.path.apply_to(config.output.display()));
}
