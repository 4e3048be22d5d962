fn main() -> Result<(), Box<dyn std::error::Error>> {
    std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path().map_err(|e| e.to_string())?);
    std::fs::create_dir_all("src/proto")?;
    println!("cargo:rerun-if-changed=proto/detect.proto");
    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .out_dir("src/proto")
        .compile_protos(&["proto/detect.proto"], &["proto/"])?;
    Ok(())
}
