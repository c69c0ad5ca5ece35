fn main() {
    if let Err(e) = carelog_risk_lib::run() {
        eprintln!("carelog-risk: {e}");
        std::process::exit(1);
    }
}
