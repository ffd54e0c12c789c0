fn main() {
    // Host builds have nothing to generate; device builds need the
    // ESP-IDF environment exported by embuild.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
