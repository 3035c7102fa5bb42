//! End-to-end runs of the `aero` binary against temporary directories.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

fn aero(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_aero"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("AERO_CONFIG")
        .output()
        .expect("failed to spawn aero")
}

fn path_str(p: &Path) -> &str {
    p.to_str().expect("utf-8 temp path")
}

const PRIVADOS: &str = "Atualizado em: 10/01/2025\n\
Código OACI;CIAD;Nome;UF;LatGeoPoint;LonGeoPoint;Operação Noturna;Situação\n\
SDAA;SP0001;Fazenda A;SP;-22,175;-47,333;VFR;\n\
SDBB;SP0002;Fazenda B;SP;-47,9;-15,5;;INTERDITADO\n\
SDCC;SP0003;Fazenda C;SP;abc;-47,1;;\n\
SDDD;SP0004;Fazenda D;SP;40,1;10,2;;\n";

const PUBLICOS: &str = "Código OACI;LatGeoPoint;LonGeoPoint;Operação Noturna\n\
SBRJ;-22,91;-43,16;VFR/IFR\n\
SBGR;-23,43;-46,47;IFR\n";

#[test]
fn clean_single_file_writes_all_reports() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("AerodromosPrivados.csv");
    fs::write(&input, PRIVADOS).unwrap();
    let outdir = dir.path().join("out");

    let out = aero(&["clean", "--in", path_str(&input), "--outdir", path_str(&outdir)]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Aeródromos Privados"));
    assert!(stdout.contains("normalized=2"));

    let clean = fs::read_to_string(outdir.join("AerodromosPrivados_clean.csv")).unwrap();
    let mut lines = clean.lines();
    assert_eq!(
        lines.next(),
        Some("Código OACI,CIAD,Nome,UF,LatGeoPoint,LonGeoPoint,Operação Noturna,Situação,LAT_DEC,LON_DEC,STATUS,CATEGORY,CLOSED,CORRECTION")
    );
    assert_eq!(clean.lines().count(), 5);
    assert!(clean.contains("SDBB,SP0002,Fazenda B,SP,\"-47,9\",\"-15,5\",,INTERDITADO,-15.5,-47.9,ok,private,true,axis_swap"));

    let rejected = fs::read_to_string(outdir.join("AerodromosPrivados_rejected.csv")).unwrap();
    assert!(rejected.starts_with("id,reason,raw_latitude,raw_longitude,detail\n"));
    assert!(rejected.contains("SDCC,unparseable,abc,"));
    assert!(rejected.contains("SDDD,out_of_bounds,"));

    let geojson: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(outdir.join("AerodromosPrivados.geojson")).unwrap()).unwrap();
    assert_eq!(geojson["features"].as_array().map(Vec::len), Some(2));

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(outdir.join("summary.json")).unwrap()).unwrap();
    let counts = &summary["datasets"][0]["counts"];
    assert_eq!(counts["total"], 4);
    assert_eq!(counts["normalized"], 2);
    assert_eq!(counts["corrected"], 1);
    assert_eq!(counts["closed"], 1);
    assert_eq!(counts["rejected"]["unparseable"], 1);
    assert_eq!(counts["rejected"]["out_of_bounds"], 1);
    assert_eq!(summary["datasets"][0]["profile"], "privados");
    assert!(summary["generated_at"].is_string());
}

#[test]
fn clean_directory_processes_profiled_files_only() {
    let dir = tempdir().unwrap();
    let indir = dir.path().join("in");
    fs::create_dir_all(&indir).unwrap();
    fs::write(indir.join("AerodromosPrivados.csv"), PRIVADOS).unwrap();
    fs::write(indir.join("AerodromosPublicos.csv"), PUBLICOS).unwrap();
    fs::write(indir.join("helipontos.csv"), "id;Lat;Lon\nH1;-22;-43\n").unwrap();
    let outdir = dir.path().join("out");

    let out = aero(&[
        "clean",
        "--in-dir",
        path_str(&indir),
        "--outdir",
        path_str(&outdir),
        "--no-geojson",
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    assert!(outdir.join("AerodromosPublicos_clean.csv").exists());
    assert!(outdir.join("AerodromosPrivados_clean.csv").exists());
    assert!(!outdir.join("helipontos_clean.csv").exists());
    assert!(!outdir.join("AerodromosPublicos.geojson").exists());

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(outdir.join("summary.json")).unwrap()).unwrap();
    let publicos = &summary["datasets"][1];
    assert_eq!(publicos["profile"], "publicos");
    assert_eq!(publicos["counts"]["categories"]["public_ifr"], 2);
}

#[test]
fn no_normalized_records_exits_3_after_writing_reports() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("lista.csv");
    fs::write(&input, "id;Lat;Lon\nA;50;10\nB;x;y\n").unwrap();
    let outdir = dir.path().join("out");

    let out = aero(&[
        "clean",
        "--in",
        path_str(&input),
        "--outdir",
        path_str(&outdir),
        "--ownership",
        "Privado",
    ]);
    assert_eq!(out.status.code(), Some(3));
    assert!(outdir.join("lista_clean.csv").exists());
    assert!(outdir.join("lista_rejected.csv").exists());
    assert!(outdir.join("summary.json").exists());
    assert!(!outdir.join("lista.geojson").exists());
}

#[test]
fn missing_coordinate_columns_exit_2() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("AerodromosPrivados.csv");
    fs::write(&input, "id;Nome;UF\nA;B;RJ\n").unwrap();

    let out = aero(&[
        "clean",
        "--in",
        path_str(&input),
        "--outdir",
        path_str(&dir.path().join("out")),
    ]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("latitude"));
}

#[test]
fn invalid_config_exits_2() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("aero.toml");
    fs::write(&config, "[envelope]\nlat_min = 10.0\nlat_max = -10.0\n").unwrap();

    let out = aero(&["--config", path_str(&config), "config"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn unknown_log_level_exits_2() {
    let out = aero(&["--log-level", "bogus", "config"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn config_prints_effective_settings() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("aero.toml");
    fs::write(&config, "corrections = [\"axis_swap\", \"decimal_shift\"]\n").unwrap();

    let out = aero(&["--config", path_str(&config), "config"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("decimal_shift"));
    assert!(stdout.contains("lat_min = -35.0"));
}

#[test]
fn check_reports_outcome() {
    let out = aero(&[
        "check",
        "--lat",
        "-43,2",
        "--lon",
        "-22,9",
        "--ownership",
        "Pública",
        "--status",
        "Interditado",
    ]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("State: corrected"));
    assert!(stdout.contains("Category: public"));
    assert!(stdout.contains("Closed: yes"));

    let out = aero(&["check", "--lat", "-22.9", "--lon", "-43.2", "--ownership", "Militar"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("Reason: ambiguous_category"));
}
