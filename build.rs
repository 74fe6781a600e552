use entities::ENTITIES;
use std::io::Write;
use std::{env, path::PathBuf};

/// Generates a sorted `(name, expansion)` table for the named-entity half of
/// `entity::unescape` from the `entities` crate's data, exactly as the
/// teacher's `build.rs` does: the entity name omits the leading `&` and
/// trailing `;`, so lookups can binary-search on the name alone.
fn main() {
    let out_dir: PathBuf = env::var("OUT_DIR").unwrap().parse().unwrap();

    let mut translated_entities = ENTITIES
        .iter()
        .filter(|e| e.entity.starts_with('&') && e.entity.ends_with(';'))
        .collect::<Vec<_>>();
    translated_entities.sort_by_key(|e| e.entity);

    let out = std::fs::File::create(out_dir.join("entitydata.rs")).unwrap();
    let mut bw = std::io::BufWriter::new(out);
    writeln!(bw, "mod entitydata {{").unwrap();
    writeln!(
        bw,
        "    pub static TRANSLATED_ENTITIES: &[(&str, &str); {}] = &[",
        translated_entities.len()
    )
    .unwrap();
    for e in translated_entities {
        writeln!(
            bw,
            "        ({:?}, {:?}),",
            &e.entity[1..e.entity.len() - 1],
            &e.characters
        )
        .unwrap();
    }
    writeln!(bw, "    ];").unwrap();
    writeln!(bw, "}}").unwrap();
}
