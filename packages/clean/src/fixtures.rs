//! Raw-file fixtures shared by the pipeline tests.

use std::path::Path;

use road_safety_config::{DatasetConfig, default_config};

use crate::provider::RawFiles;

const CHARACTERISTICS_HEADER: &str =
    "\"Accident_Id\";\"jour\";\"mois\";\"an\";\"hrmn\";\"lum\";\"dep\";\"com\";\"agg\";\"int\";\"lat\";\"long\"";

/// The embedded dataset config rooted at a temporary directory.
pub fn test_config(data_dir: &Path) -> DatasetConfig {
    default_config().clone().with_data_dir(data_dir)
}

fn write_files(
    config: &DatasetConfig,
    characteristics: &[&str],
    locations: &[&str],
    casualties: &[&str],
) -> RawFiles {
    let dir = config.raw_dir();
    std::fs::create_dir_all(&dir).unwrap();

    let files = RawFiles {
        characteristics: dir.join(&config.raw_files.characteristics),
        locations: dir.join(&config.raw_files.locations),
        casualties: dir.join(&config.raw_files.casualties),
    };

    let mut body = vec![CHARACTERISTICS_HEADER];
    body.extend_from_slice(characteristics);
    std::fs::write(&files.characteristics, body.join("\n")).unwrap();

    let mut body = vec!["\"Num_Acc\";\"catr\";\"surf\""];
    body.extend_from_slice(locations);
    std::fs::write(&files.locations, body.join("\n")).unwrap();

    let mut body = vec!["\"Num_Acc\";\"id_usager\";\"grav\""];
    body.extend_from_slice(casualties);
    std::fs::write(&files.casualties, body.join("\n")).unwrap();

    files
}

/// Accidents 1 and 2 are locatable, 3 is not. Only 1 has a location row.
/// Accident 1 has a fatal and a minor casualty, accident 2 a minor one.
pub fn write_scenario(config: &DatasetConfig) -> RawFiles {
    write_files(
        config,
        &[
            "\"1\";\"15\";\"03\";\"2022\";\"08:30\";\"5\";\"75\";\"75056\";\"2\";\"1\";\"48,85\";\"2,35\"",
            "\"2\";\"16\";\"03\";\"2022\";\"1745\";\"1\";\"69\";\"69123\";\"1\";\"2\";\"45,76\";\"4,83\"",
            "\"3\";\"17\";\"03\";\"2022\";\"2210\";\"3\";\"13\";\"13055\";\"1\";\"1\";\"-1\";\"\"",
        ],
        &["\"1\";\"3\";\"2\""],
        &[
            "\"1\";\"1 099 700\";\"2\"",
            "\"1\";\"1 099 701\";\"4\"",
            "\"2\";\"1 099 702\";\"4\"",
        ],
    )
}

/// Dirty values: unmapped codes, bad dates and hours, a duplicated id,
/// unusable coordinates, orphan location and casualty rows.
pub fn write_dirty(config: &DatasetConfig) -> RawFiles {
    write_files(
        config,
        &[
            "\"10\";\"1\";\"13\";\"2022\";\"abcd\";\"9\";\"33\";\"33063\";\"2\";\"1\";\"44,84\";\"-0,58\"",
            "\"10\";\"2\";\"01\";\"2022\";\"0900\";\"1\";\"33\";\"33063\";\"2\";\"1\";\"44,80\";\"-0,50\"",
            "\"20\";\"5\";\"07\";\"2022\";\"\";\"\";\"971\";\"97101\";\"\";\"1\";\"16,24\";\"-61,53\"",
            "\"30\";\"6\";\"07\";\"2022\";\"1200\";\"2\";\"59\";\"59350\";\"1\";\"1\";\"None\";\"3,06\"",
            "\"40\";\"7\";\"07\";\"2022\";\"1300\";\"2\";\"59\";\"59350\";\"1\";\"1\";\"nan\";\"3,06\"",
            "\"50\";\"8\";\"07\";\"2022\";\"1400\";\"2\";\"59\";\"59350\";\"1\";\"1\";\"inf\";\"3,06\"",
            "\"\";\"9\";\"07\";\"2022\";\"1500\";\"2\";\"59\";\"59350\";\"1\";\"1\";\"50,1\";\"3,06\"",
        ],
        &["\"10\";\"3\";\"x\"", "\"99\";\"3\";\"1\""],
        &[
            "\"10\";\"a\";\"-1\"",
            "\"10\";\"b\";\"3\"",
            "\"77\";\"c\";\"2\"",
            "\"\";\"d\";\"2\"",
        ],
    )
}
