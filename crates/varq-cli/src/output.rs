//! Terminal output helpers.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use varq_ops::PauliHamiltonian;
use varq_qaoa::{QaoaResult, Status};

/// Spinner shown while an optimization runs.
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Print a boxed report header.
pub fn print_header(title: &str) {
    println!();
    println!("{}", style("═".repeat(60)).cyan());
    println!("{}", style(format!("  {}", title)).cyan().bold());
    println!("{}", style("═".repeat(60)).cyan());
    println!();
}

/// Print a section title.
pub fn print_section(title: &str) {
    println!();
    println!("{}", style(format!("▶ {}", title)).green().bold());
    println!("{}", style("─".repeat(40)).dim());
}

/// Print a labelled value.
pub fn print_result(label: &str, value: impl std::fmt::Display) {
    println!("  {} {}", style(format!("{}:", label)).dim(), value);
}

/// Print a success line.
pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print a warning line.
pub fn print_warning(message: &str) {
    println!("{} {}", style("!").yellow().bold(), message);
}

/// Print an info line.
pub fn print_info(message: &str) {
    println!("{} {}", style("ℹ").blue(), message);
}

fn format_angles(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{v:.4}")).collect();
    format!("[{}]", parts.join(", "))
}

/// Bitstring of `index` over `num_qubits`, qubit 0 rightmost.
fn bitstring(index: usize, num_qubits: usize) -> String {
    format!("{index:0num_qubits$b}")
}

/// Full report for one run.
pub fn print_run(result: &QaoaResult, num_qubits: usize) {
    let opt = &result.optimization;
    let depth = opt.x.len() / 2;

    print_section(&format!("{} / {}", result.strategy, result.oracle));
    print_result("Energy", format!("{:.6}", opt.fun));
    if let Some(ground) = result.ground_energy {
        print_result("Ground energy", format!("{ground:.6}"));
    }
    if let Some(ratio) = result.approximation_ratio {
        print_result("Approximation ratio", format!("{:.2}%", ratio * 100.0));
    }
    print_result("Evaluations", opt.nfev);
    print_result("Iterations", opt.nit);
    print_result("Initial β, γ", format_angles(&result.initial_params));
    print_result("Optimal β", format_angles(&opt.x[..depth]));
    print_result("Optimal γ", format_angles(&opt.x[depth..]));

    println!();
    println!("  {}", style("Most likely outcomes:").dim());
    let mut outcomes: Vec<(usize, f64)> = result
        .final_state_probabilities
        .iter()
        .copied()
        .enumerate()
        .collect();
    outcomes.sort_by(|a, b| b.1.total_cmp(&a.1));
    for (index, p) in outcomes.into_iter().take(4).filter(|&(_, p)| p > 1e-6) {
        println!("    |{}⟩  {:.4}", bitstring(index, num_qubits), p);
    }

    println!();
    match opt.status {
        Status::Converged => print_success(opt.status.message()),
        _ => print_warning(opt.status.message()),
    }
}

/// Side-by-side summary of several runs from one start.
pub fn print_comparison(results: &[QaoaResult]) {
    print_section("Comparison");
    println!(
        "  {:<14} {:>12} {:>8} {:>8} {:>10}",
        style("strategy").dim(),
        style("energy").dim(),
        style("nfev").dim(),
        style("nit").dim(),
        style("converged").dim()
    );
    for r in results {
        let opt = &r.optimization;
        println!(
            "  {:<14} {:>12.6} {:>8} {:>8} {:>10}",
            r.strategy.to_string(),
            opt.fun,
            opt.nfev,
            opt.nit,
            if opt.converged { "yes" } else { "no" }
        );
    }

    if let Some(cheapest) = results.iter().min_by_key(|r| r.optimization.nfev) {
        println!();
        print_info(&format!(
            "{} used the fewest oracle calls ({})",
            cheapest.strategy, cheapest.optimization.nfev
        ));
    }
}

/// Terms of an observable, one per line.
pub fn print_observable(label: &str, h: &PauliHamiltonian) {
    print_section(label);
    for term in &h.terms {
        println!("  {term}");
    }
}

/// Dense matrix, real and imaginary parts.
pub fn print_matrix(h: &PauliHamiltonian, num_qubits: usize) -> varq_ops::OpsResult<()> {
    let m = h.to_matrix(num_qubits)?;
    for row in m.rows() {
        let cells: Vec<String> = row
            .iter()
            .map(|z| {
                if z.im == 0.0 {
                    format!("{:>7.3}", z.re)
                } else {
                    format!("{:>7.3}{:+.3}i", z.re, z.im)
                }
            })
            .collect();
        println!("  [{}]", cells.join(" "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitstring_is_little_endian() {
        assert_eq!(bitstring(1, 2), "01");
        assert_eq!(bitstring(2, 3), "010");
        assert_eq!(bitstring(5, 4), "0101");
    }

    #[test]
    fn test_format_angles() {
        assert_eq!(format_angles(&[0.5, -1.0]), "[0.5000, -1.0000]");
        assert_eq!(format_angles(&[]), "[]");
    }
}
