//! Binary that emits command-line options markdown to stdout.

fn main() {
    print!("{}", tourism_dash_cli::render_options_markdown());
}
