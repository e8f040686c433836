use lazy_static::lazy_static;

/// Built-in defaults behind the command-line options.
pub struct Defaults {
    pub exponent: String,
    pub lookup_url: String,
    pub lookup_timeout: u64,
    pub progress_interval: u64,
}

lazy_static! {
    pub static ref CONFIG_DEF: Defaults = Defaults {
        exponent: String::from("65537"),
        lookup_url: String::from("http://factordb.com/api"),
        lookup_timeout: 10,
        progress_interval: 100_000,
    };
}
