use sheet_dashboard::chart::{format_axis_tick, ChartSeries};
use sheet_dashboard::{DashboardView, SheetDashboard};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

fn print_chart(chart: &ChartSeries) {
    let latest = chart
        .present_points()
        .last()
        .map(|(label, v)| format!("{} @ {}", format_axis_tick(v), label))
        .unwrap_or_else(|| "no data".to_string());
    let range = chart
        .value_range()
        .map(|(lo, hi)| format!("{} .. {}", format_axis_tick(lo), format_axis_tick(hi)))
        .unwrap_or_default();
    println!(
        "  {:<24} {:>3} points  latest {:<20} range {}",
        chart.title,
        chart.points.len(),
        latest,
        range
    );
}

fn print_view(view: &DashboardView) {
    match view {
        DashboardView::Loading => println!("Loading data..."),
        DashboardView::Error(message) => println!("Error! {}", message),
        DashboardView::Content { charts, error } => {
            if let Some(message) = error {
                println!("Error! {} (showing last good data)", message);
            }
            println!("{} charts", charts.len());
            for chart in charts {
                print_chart(chart);
            }
        }
    }
}

#[tokio::main]
async fn main() -> sheet_dashboard::Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let dashboard = SheetDashboard::builder().build()?;
    info!("{}", dashboard);

    let mut controller = dashboard.controller();
    let mut updates = controller.subscribe();
    controller.start();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = DashboardView::from_state(&updates.borrow_and_update());
                print_view(&view);
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    error!(error = %e, "failed to listen for ctrl-c");
                }
                break;
            }
        }
    }

    controller.stop();
    info!("shutdown");
    Ok(())
}
