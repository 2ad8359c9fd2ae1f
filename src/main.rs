fn main() {
    println!("vescore-rs - Variant Effect Scoring Tool");
    println!();
    println!("Tools in this package:");
    println!("  vescore    - Analyze a single variant: fetch window, score, classify (JSON out)");
    println!("  calibrate  - Derive threshold and confidence scales from a labeled table");
    println!();
    println!("For help with each tool:");
    println!("  cargo run --bin vescore -- --help");
    println!("  cargo run --bin calibrate -- --help");
    println!();
    println!("Quick start example:");
    println!("  cargo run -- --position 43119628 --alternative G \\");
    println!("      --chromosome chr17 --scoring-url http://localhost:8000/score");
}
