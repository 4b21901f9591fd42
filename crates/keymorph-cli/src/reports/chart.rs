/// ASCII chart of best-ever fitness over the generations of a run,
/// subsampled to the chart width.
pub fn print_convergence_chart(trajectory: &[f64]) {
    const HEIGHT: usize = 16;
    const WIDTH: usize = 60;

    if trajectory.len() < 2 {
        return;
    }

    let min = trajectory.iter().copied().fold(f64::INFINITY, f64::min);
    let max = trajectory.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = (max - min).max(f64::EPSILON);

    let step = trajectory.len().div_ceil(WIDTH);
    let columns: Vec<f64> = trajectory.iter().copied().step_by(step).collect();

    let mut canvas = vec![vec![' '; columns.len()]; HEIGHT];
    for (col, &fitness) in columns.iter().enumerate() {
        let scaled = ((fitness - min) / span * (HEIGHT - 1) as f64).round() as usize;
        let row = HEIGHT - 1 - scaled.min(HEIGHT - 1);
        canvas[row][col] = '*';
        for filler in canvas.iter_mut().skip(row + 1) {
            if filler[col] == ' ' {
                filler[col] = '.';
            }
        }
    }

    println!("\nFitness convergence:");
    for (i, line) in canvas.iter().enumerate() {
        let level = max - span * i as f64 / (HEIGHT - 1) as f64;
        println!("{:>9.5} |{}", level, line.iter().collect::<String>());
    }
    println!(
        "{:>9} +{}",
        "",
        "-".repeat(columns.len())
    );
    println!(
        "{:>9}  0{:>width$}",
        "",
        trajectory.len() - 1,
        width = columns.len().saturating_sub(1)
    );

    println!(
        "  start {:.6} -> final {:.6} over {} generations",
        trajectory[0],
        trajectory[trajectory.len() - 1],
        trajectory.len()
    );
}
