//! Demo showing the diffusion kernel on a small categorical space

use rdkernel::{DiffusionKernel, Lengthscale, PointBatch};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Diffusion Kernel Demo ===");

    // Two binary dimensions and one three-way choice
    let kernel = DiffusionKernel::new(vec![2, 2, 3])?;
    let points = PointBatch::new(vec![
        vec![0, 0, 0],
        vec![0, 1, 0],
        vec![1, 1, 0],
        vec![1, 1, 2],
    ])?;

    for values in [vec![0.1, 0.1, 0.1], vec![0.5, 0.5, 0.5], vec![2.0, 2.0, 2.0]] {
        let ls = Lengthscale::new(values.clone())?;
        println!("\n--- lengthscale {values:?} ---");
        println!("base per dimension: {:?}", kernel.base(&ls)?);

        let k = kernel
            .evaluate(&ls, &points, &points, false)?
            .into_matrix()
            .ok_or("expected a full matrix")?;
        for i in 0..k.rows() {
            let row: Vec<String> = k.row(i).iter().map(|v| format!("{v:.4}")).collect();
            println!("  [{}]", row.join(", "));
        }
    }

    println!("\n--- per-dimension gradient at lengthscale 0.5 ---");
    let ls = Lengthscale::constant(3, 0.5)?;
    for (i, grad) in kernel.gradient(&ls, &points, &points, false)?.iter().enumerate() {
        let total: f64 = grad.values().iter().sum();
        println!("  dimension {i}: sum of dK/dl = {total:.4}");
    }

    Ok(())
}
