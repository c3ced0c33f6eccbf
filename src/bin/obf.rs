use re_lab::core::crackme::{self, ObfCrackme};

fn main() {
    re_lab::init_logging();

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    // Always 0, a wrong input is not a failure.
    crackme::run(&ObfCrackme::default(), &mut stdin.lock(), &mut stdout.lock());
}
