use re_lab::core::crackme::{self, GuessCrackme};

fn main() {
    re_lab::init_logging();

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    crackme::run(&GuessCrackme::default(), &mut stdin.lock(), &mut stdout.lock());
}
