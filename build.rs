fn main() {
    let now = time::OffsetDateTime::now_utc();
    let month = now.month().to_string();

    let date = std::env::var("LUXTEST_BUILD_DATE")
        .unwrap_or_else(|_| format!("{} {:>2} {}", &month[..3], now.day(), now.year()));
    let time = std::env::var("LUXTEST_BUILD_TIME")
        .unwrap_or_else(|_| format!("{:02}:{:02}:{:02}", now.hour(), now.minute(), now.second()));

    println!("cargo:rustc-env=LUXTEST_BUILD_DATE={}", date);
    println!("cargo:rustc-env=LUXTEST_BUILD_TIME={}", time);
    println!("cargo:rerun-if-env-changed=LUXTEST_BUILD_DATE");
    println!("cargo:rerun-if-env-changed=LUXTEST_BUILD_TIME");
}
