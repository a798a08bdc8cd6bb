fn main() -> std::process::ExitCode {
    scan_filer::run()
}
