fn main() {
    if let Err(err) = flowboard::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
