use re_lab::core::crackme::{self, PasswordCrackme};

fn main() {
    re_lab::init_logging();

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let code = crackme::run(
        &PasswordCrackme::default(),
        &mut stdin.lock(),
        &mut stdout.lock(),
    );
    std::process::exit(code);
}
