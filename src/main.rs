fn main() {
    if let Err(err) = clause_graph::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
