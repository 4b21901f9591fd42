use keymorph_core::geometry::{Geometry, Row};
use keymorph_core::Individual;

/// Prints the layout as physical keyboard rows, slots ordered left to
/// right. Control glyphs get readable labels.
pub fn print_layout_grid(individual: &Individual, geometry: &Geometry) {
    println!("\nOptimized layout:");

    for row in Row::ALL {
        let mut slots: Vec<(f64, char)> = individual
            .layout
            .iter()
            .enumerate()
            .filter(|(pos, _)| geometry.row(*pos) == row)
            .map(|(pos, &c)| (geometry.slot(pos).x, c))
            .collect();

        if slots.is_empty() {
            continue;
        }

        slots.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let keys: Vec<String> = slots.into_iter().map(|(_, c)| label(c)).collect();
        println!("  {:>7}: {}", row.label(), keys.join(" "));
    }

    println!();
}

fn label(c: char) -> String {
    match c {
        ' ' => "spc".to_string(),
        '\t' => "tab".to_string(),
        _ => c.to_string(),
    }
}
