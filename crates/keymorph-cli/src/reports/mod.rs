mod chart;
mod grid;
mod heatmap;
mod tables;

pub use chart::print_convergence_chart;
pub use grid::print_layout_grid;
pub use heatmap::print_heatmap;
pub use tables::{print_comparison_table, print_components, print_finger_loads};

use keymorph_core::config::EngineConfig;
use tracing::info;

pub fn print_config(config: &EngineConfig) {
    info!("Search configuration:");
    info!("  population:  {}", config.population_size);
    if config.max_generations > 0 {
        info!("  generations: {}", config.max_generations);
    } else {
        info!("  generations: unlimited (convergence-based)");
    }
    if config.convergence_stops > 0 {
        info!(
            "  convergence: stop after {} stagnant generations (tolerance {:e})",
            config.convergence_stops, config.convergence_tolerance
        );
    }
    info!("  mutation:    {:.2}", config.mutation_rate);
    info!("  crossover:   {:.2}", config.crossover_rate);
    info!("  elites:      {}", config.elite_count);
    info!("  tournament:  {}", config.tournament_size);
    info!("  workers:     {}", config.resolved_workers());
}
