//! Solution output: the route file format and a console summary.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::geometry::Site;
use crate::instance::Instance;
use crate::solution::CompleteRoute;
use crate::validation::Metrics;

/// Format a duration as hours, minutes, and seconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}h {:02}m {:02}s", hours, minutes, seconds)
}

/// Free-text tag describing the machine the run happened on.
pub fn environment_tag() -> String {
    format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)
}

/// The two lines describing one route.
///
/// First the visit sequence (`garage - depot [load] - station (qty) - ... - garage`),
/// then the product carried and cumulative changeover cost at every stop
/// after the starting garage.
pub fn format_route(instance: &Instance, route: &CompleteRoute) -> (String, String) {
    let stops = route.stops(instance);

    let visits: Vec<String> = stops
        .iter()
        .map(|stop| match (stop.site, stop.quantity) {
            (Site::Depot(id), Some(load)) => format!("{} [{}]", id, load as i64),
            (Site::Station(id), Some(qty)) => format!("{} ({})", id, qty as i64),
            (site, _) => site.id().to_string(),
        })
        .collect();

    let products: Vec<String> = stops
        .iter()
        .skip(1)
        .map(|stop| format!("{}({:.1})", stop.product, stop.cumulative_changeover))
        .collect();

    (
        format!("{}: {}", route.truck_id(), visits.join(" - ")),
        format!("{}: {}", route.truck_id(), products.join(" - ")),
    )
}

/// Render a full solution file: every route followed by the run metrics.
pub fn format_solution(instance: &Instance, routes: &[CompleteRoute], metrics: &Metrics) -> String {
    let mut out = String::new();

    for route in routes {
        let (visits, products) = format_route(instance, route);
        let _ = writeln!(out, "{}", visits);
        let _ = writeln!(out, "{}", products);
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "{}", metrics.num_vehicles);
    let _ = writeln!(out, "{}", metrics.num_product_changes);
    let _ = writeln!(out, "{:.2}", metrics.total_changeover_cost);
    let _ = writeln!(out, "{:.2}", metrics.total_distance);
    let _ = writeln!(out, "{}", environment_tag());
    let _ = writeln!(out, "{:.3}", metrics.computation_time);

    out
}

/// Save a solution to a file.
pub fn save_solution<P: AsRef<Path>>(
    instance: &Instance,
    routes: &[CompleteRoute],
    metrics: &Metrics,
    path: P,
) -> std::io::Result<()> {
    fs::write(path, format_solution(instance, routes, metrics))
}

/// Human-readable summary of a solution.
pub fn format_summary(instance: &Instance, routes: &[CompleteRoute], metrics: &Metrics) -> String {
    let rule = "=".repeat(70);
    let mut out = String::new();

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "MPVRP-CC SOLUTION - {}", instance.name);
    let _ = writeln!(out, "{}", rule);

    for route in routes {
        let _ = writeln!(out);
        let _ = writeln!(out, "Truck {} (garage {}):", route.truck_id(), route.garage_id());
        let _ = writeln!(out, "  Distance: {:.2}", route.total_distance());
        let _ = writeln!(out, "  Changeover cost: {:.2}", route.total_changeover_cost());
        let _ = writeln!(out, "  Total cost: {:.2}", route.total_cost());

        for (i, mini_route) in route.mini_routes().iter().enumerate() {
            let _ = writeln!(
                out,
                "  Mini-route {}: product {}, load {:.2} ({} stations)",
                i + 1,
                mini_route.product_id,
                mini_route.load_quantity,
                mini_route.stations.len()
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "GLOBAL METRICS");
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Vehicles used        : {}", metrics.num_vehicles);
    let _ = writeln!(out, "Product changes      : {}", metrics.num_product_changes);
    let _ = writeln!(out, "Changeover cost      : {:.2}", metrics.total_changeover_cost);
    let _ = writeln!(out, "Total distance       : {:.2}", metrics.total_distance);
    let _ = writeln!(out, "Total cost           : {:.2}", metrics.total_cost);
    let _ = writeln!(
        out,
        "Computation time     : {:.3} s ({})",
        metrics.computation_time,
        format_duration(Duration::from_secs_f64(metrics.computation_time.max(0.0)))
    );
    let _ = writeln!(out, "{}", rule);

    out
}

/// Print the solution summary to the console.
pub fn print_solution(instance: &Instance, routes: &[CompleteRoute], metrics: &Metrics) {
    print!("{}", format_summary(instance, routes, metrics));
}
