use keymorph_core::corpus::FrequencyModel;
use keymorph_core::geometry::{Geometry, Row};
use keymorph_core::Individual;

/// Usage heatmap: each key shown with a shade block scaled to its share
/// of the typed-character mass.
pub fn print_heatmap(individual: &Individual, geometry: &Geometry, model: &dyn FrequencyModel) {
    let total = model.total_chars();
    if total == 0 {
        println!("No usage data available for heatmap");
        return;
    }

    println!("\nUsage heatmap (darker = more frequent):");

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

        let cells: Vec<String> = slots
            .into_iter()
            .map(|(_, c)| {
                let percent = model.char_count(c) as f64 * 100.0 / total as f64;
                format!("{}{}", printable(c), shade(percent))
            })
            .collect();

        println!("  {:>7}: {}", row.label(), cells.join(" "));
    }

    println!("  shades: \u{2588} >5%  \u{2593} >2%  \u{2592} >1%  \u{2591} >0.1%");
}

fn printable(c: char) -> char {
    match c {
        ' ' => '\u{2423}',
        '\t' => '\u{21e5}',
        _ => c,
    }
}

fn shade(percent: f64) -> char {
    if percent > 5.0 {
        '\u{2588}'
    } else if percent > 2.0 {
        '\u{2593}'
    } else if percent > 1.0 {
        '\u{2592}'
    } else if percent > 0.1 {
        '\u{2591}'
    } else {
        ' '
    }
}
