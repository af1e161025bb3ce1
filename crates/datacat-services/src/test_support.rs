//! Small catalog on disk shared by the service tests.

use std::path::{Path, PathBuf};

use datacat_store::Store;
use tempfile::TempDir;

use crate::rules::import_rules;
use crate::Catalog;

pub(crate) const RULES_CSV: &str = "\
model,slug,datatype,multiple,translation,external_model,reference_table,external_model_display_keys,mandatory,is_facet,is_indexed,is_controled,name_fr,name_en,ITEM_order,constraint
organization,id,id,False,False,,,,False,False,False,False,Identifiant,Identifier,0,
organization,name,string,False,True,,,,True,False,True,False,Nom,Name,1,
organization,acronym,string,False,False,,,,False,False,True,False,Acronyme,Acronym,2,
dataset,id,id,False,False,,,,False,False,False,False,Identifiant,Identifier,0,
dataset,title,string,False,True,,,,True,False,True,False,Titre,Title,1,
dataset,theme,string,True,True,,ref_theme,,False,True,True,True,Thème,Theme,2,
dataset,organizations,object,True,False,organization,,name|id,False,True,False,False,Organisations,Organizations,3,
dataset,is_open,boolean,False,False,,,,False,True,False,False,Ouvert,Open,4,
dataset,year,integer,False,False,,,,False,False,True,False,Année,Year,5,
dataset,comment_quality,string,False,True,,,,False,False,False,False,Commentaire qualité,Quality comment,6,
dataset,internal_note,string,False,False,,,,False,False,False,False,Note interne,Internal note,-1,
dataset,reviews,object,True,False,comment,,,False,False,False,False,Avis,Reviews,7,
dataset,perimeter,string,False,True,,ref_perimeter,,False,False,False,True,Périmètre,Perimeter,8,
user,email,email,False,False,,,,True,False,False,False,Courriel,Email,1,
user,is_active,boolean,False,False,,,,False,False,False,False,Actif,Active,2,
";

pub(crate) const THEME_CSV: &str = "\
name_fr,name_en,uri
Eau,Water,http://example.org/theme/eau
Air,,http://example.org/theme/air
Eau,Water,http://example.org/theme/eau
,,
";

pub(crate) const ORGANIZATIONS_FR_CSV: &str = "\
Nom,Acronyme
Ministère,MIN
Agence,AG
";

pub(crate) const DATASETS_FR_CSV: &str = "\
Titre,Thème,Organisations,Ouvert,Année,Commentaire qualité,Colonne inconnue
Qualité de l'air,Air|Eau,Ministère,true,2021,Données partielles,x
Eau potable,Eau,Ministère|Inconnue,NA,NA,,y
";

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

/// Data directory laid out the way `init` expects it, under `<tmp>/data`.
pub(crate) fn fixtures() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    write(&data, "rules.csv", RULES_CSV);
    write(&data, "references/ref_theme.csv", THEME_CSV);
    write(&data, "organizations/organizations_fr.csv", ORGANIZATIONS_FR_CSV);
    write(&data, "datasets/datasets_fr.csv", DATASETS_FR_CSV);
    dir
}

/// Temporary store with the fixture rules imported. Returns the data directory.
pub(crate) fn catalog_with_fixtures(dir: &TempDir) -> (Catalog, PathBuf) {
    let data = dir.path().join("data");
    let mut catalog = Catalog::open(Store::temporary().unwrap()).unwrap();
    import_rules(&mut catalog, &data.join("rules.csv")).unwrap();
    (catalog, data)
}
