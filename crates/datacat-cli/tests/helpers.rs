use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;

pub const RULES_CSV: &str = "\
model,slug,datatype,multiple,translation,external_model,reference_table,external_model_display_keys,mandatory,is_facet,is_indexed,is_controled,name_fr,name_en,ITEM_order
organization,id,id,False,False,,,,False,False,False,False,Identifiant,Identifier,0
organization,name,string,False,True,,,,True,False,True,False,Nom,Name,1
dataset,id,id,False,False,,,,False,False,False,False,Identifiant,Identifier,0
dataset,title,string,False,True,,,,True,False,True,False,Titre,Title,1
dataset,theme,string,True,True,,ref_theme,,False,True,True,True,Thème,Theme,2
dataset,organizations,object,True,False,organization,,name|id,False,True,False,False,Organisations,Organizations,3
dataset,is_open,boolean,False,False,,,,False,True,False,False,Ouvert,Open,4
dataset,comment_quality,string,False,True,,,,False,False,False,False,Commentaire qualité,Quality comment,5
";

pub const CONFIG: &str = "\
data_dir = \"data\"
store_path = \"store\"
models = [\"organization\", \"dataset\"]

[export]
out_dir = \"export\"

[codegen]
out_dir = \"api\"

[schema]
out_dir = \"schemas\"
";

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

/// A working directory with `datacat.toml` and a small `data/` tree.
pub fn workspace() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(root, "datacat.toml", CONFIG);
    write(root, "data/rules.csv", RULES_CSV);
    write(
        root,
        "data/references/ref_theme.csv",
        "name_fr,name_en,uri\nEau,Water,http://example.org/theme/eau\nAir,,http://example.org/theme/air\n",
    );
    write(
        root,
        "data/organizations/organizations_fr.csv",
        "Nom\nMinistère\nAgence\n",
    );
    write(
        root,
        "data/datasets/datasets_fr.csv",
        "Titre,Thème,Organisations,Ouvert,Commentaire qualité\n\
         Qualité de l'air,Air|Eau,Ministère,true,Données partielles\n\
         Eau potable,Eau,Agence,NA,\n",
    );
    dir
}

/// `datacat` running inside `dir` with its configuration file.
pub fn datacat(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("datacat").expect("binary built");
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .arg("--config")
        .arg(dir.join("datacat.toml"));
    cmd
}
