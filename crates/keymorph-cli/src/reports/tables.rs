use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use keymorph_core::analytics::{LayoutAnalytics, QwertyComparison};
use keymorph_core::fitness::{ComponentScores, FitnessWeights};

const COMPONENT_ROWS: [(&str, fn(&ComponentScores) -> f64); 13] = [
    ("Finger distance", |s| s.finger_distance),
    ("Hand alternation", |s| s.hand_alternation),
    ("Finger balance", |s| s.finger_balance),
    ("Row jumping", |s| s.row_jumping),
    ("Bigram efficiency", |s| s.bigram_efficiency),
    ("Same-finger digrams", |s| s.same_finger_digrams),
    ("Lateral stretch", |s| s.lateral_stretch),
    ("Roll quality", |s| s.roll_quality),
    ("Layer penalty", |s| s.layer_penalty),
    ("Home-row bonus", |s| s.home_row_bonus),
    ("Roll ratio target", |s| s.roll_ratio_target),
    ("Threshold bonuses", |s| s.threshold_bonuses),
    ("Position matching", |s| s.position_matching),
];

pub fn print_components(cmp: &QwertyComparison) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Component").add_attribute(Attribute::Bold),
        Cell::new("Optimized").fg(Color::Cyan),
        Cell::new("QWERTY"),
        Cell::new("Delta"),
    ]);

    for (name, get) in COMPONENT_ROWS {
        let ours = get(&cmp.optimized);
        let base = get(&cmp.qwerty);
        let delta = ours - base;
        let delta_cell = if delta >= 0.0 {
            Cell::new(format!("+{delta:.4}")).fg(Color::Green)
        } else {
            Cell::new(format!("{delta:.4}")).fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{ours:.4}")).fg(Color::Cyan),
            Cell::new(format!("{base:.4}")),
            delta_cell,
        ]);
    }

    table.add_row(vec![
        Cell::new("Composite").add_attribute(Attribute::Bold),
        Cell::new(format!("{:.6}", cmp.optimized_fitness))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{:.6}", cmp.qwerty_fitness)),
        Cell::new(format!("{:+.2}%", cmp.improvement_pct)).add_attribute(Attribute::Bold),
    ]);

    for i in 1..=3 {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    println!("\n{table}");
}

const FINGER_LABELS: [&str; 8] = [
    "L-pinky", "L-ring", "L-middle", "L-index", "R-index", "R-middle", "R-ring", "R-pinky",
];

pub fn print_finger_loads(analytics: &LayoutAnalytics) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(
        std::iter::once(Cell::new("Finger").add_attribute(Attribute::Bold))
            .chain(FINGER_LABELS.iter().map(|&l| Cell::new(l)))
            .collect::<Vec<_>>(),
    );
    table.add_row(
        std::iter::once(Cell::new("Load").add_attribute(Attribute::Bold))
            .chain(
                analytics
                    .finger_load
                    .iter()
                    .map(|share| Cell::new(format!("{:.1}%", share * 100.0))),
            )
            .collect::<Vec<_>>(),
    );

    println!("\n{table}");

    let (left, right) = analytics.hand_balance;
    let mut rows = Table::new();
    rows.load_preset(ASCII_FULL);
    rows.add_row(vec![
        Cell::new("Hands L/R").add_attribute(Attribute::Bold),
        Cell::new(format!("{:.1}% / {:.1}%", left * 100.0, right * 100.0)),
    ]);
    rows.add_row(vec![
        Cell::new("Home row"),
        Cell::new(format!("{:.1}%", analytics.home_row_usage * 100.0)),
    ]);
    rows.add_row(vec![
        Cell::new("SFB rate").fg(Color::Red),
        Cell::new(format!("{:.2}%", analytics.sfb_rate * 100.0)),
    ]);
    rows.add_row(vec![
        Cell::new("Alternation"),
        Cell::new(format!("{:.1}%", analytics.alternation_rate * 100.0)),
    ]);
    rows.add_row(vec![
        Cell::new("Rolls").fg(Color::Green),
        Cell::new(format!("{:.1}%", analytics.roll_rate * 100.0)),
    ]);
    let (base, shift, altgr) = analytics.layer_load;
    rows.add_row(vec![
        Cell::new("Layers base/shift/altgr"),
        Cell::new(format!(
            "{:.1}% / {:.1}% / {:.1}%",
            base * 100.0,
            shift * 100.0,
            altgr * 100.0
        )),
    ]);

    println!("\n{rows}");
}

pub fn print_comparison_table(rows: &[(String, ComponentScores)], weights: &FitnessWeights) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(
        std::iter::once(Cell::new("Layout").add_attribute(Attribute::Bold))
            .chain(COMPONENT_ROWS.iter().map(|(name, _)| Cell::new(*name)))
            .chain(std::iter::once(
                Cell::new("Composite").add_attribute(Attribute::Bold),
            ))
            .collect::<Vec<_>>(),
    );

    for (name, scores) in rows {
        table.add_row(
            std::iter::once(Cell::new(name).add_attribute(Attribute::Bold))
                .chain(
                    COMPONENT_ROWS
                        .iter()
                        .map(|(_, get)| Cell::new(format!("{:.3}", get(scores)))),
                )
                .chain(std::iter::once(
                    Cell::new(format!("{:.6}", scores.weighted_total(weights)))
                        .fg(Color::Cyan)
                        .add_attribute(Attribute::Bold),
                ))
                .collect::<Vec<_>>(),
        );
    }

    println!("\n{table}");
}
