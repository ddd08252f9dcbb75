fn main() {
    if let Err(err) = structural_draw::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
