//! Reading and writing instances in the positional `.dat` and JSON formats.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use crate::error::LoadError;
use crate::instance::{Instance, ProductId};

/// Load an instance, choosing the format from the file extension.
///
/// `.json` files are read as JSON, anything else as `.dat`.
pub fn load_instance<P: AsRef<Path>>(path: P) -> Result<Instance, LoadError> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        load_from_json(path)
    } else {
        load_from_dat(path)
    }
}

/// Load an instance from a positional `.dat` file.
pub fn load_from_dat<P: AsRef<Path>>(path: P) -> Result<Instance, LoadError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    parse_dat(&content, &file_name(path))
}

/// Parse the positional format.
///
/// Header `products depots garages stations vehicles`, then the changeover
/// matrix, trucks, depots, garages and stations, one record per line.
/// Blank lines and lines starting with `#` or `"` are ignored.
pub fn parse_dat(content: &str, name: &str) -> Result<Instance, LoadError> {
    let mut lines = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with('"'))
        .enumerate()
        .map(|(i, l)| (i + 1, l));

    let mut next_record = |expected: &str| -> Result<(usize, Vec<f64>), LoadError> {
        let (line_no, line) = lines
            .next()
            .ok_or_else(|| LoadError::format(0, format!("missing {}", expected)))?;
        let values = line
            .split_whitespace()
            .map(|token| {
                token.parse::<f64>().map_err(|_| {
                    LoadError::format(line_no, format!("invalid number '{}' in {}", token, expected))
                })
            })
            .collect::<Result<Vec<f64>, LoadError>>()?;
        Ok((line_no, values))
    };

    let (line_no, header) = next_record("header")?;
    if header.len() < 5 {
        return Err(LoadError::format(line_no, "header needs 5 counts"));
    }
    let counts: Vec<usize> = header[..5].iter().map(|&v| v as usize).collect();
    let (nb_products, nb_depots, nb_garages, nb_stations, nb_vehicles) =
        (counts[0], counts[1], counts[2], counts[3], counts[4]);

    let mut instance = Instance::new(name);

    let mut changeover = BTreeMap::new();
    for from in 0..nb_products {
        let (line_no, row) = next_record("changeover row")?;
        require_len(&row, nb_products, line_no, "changeover row")?;
        for (to, &cost) in row.iter().take(nb_products).enumerate() {
            changeover.insert((from, to), cost);
        }
    }
    instance.set_changeover_costs(changeover);

    for _ in 0..nb_vehicles {
        let (line_no, parts) = next_record("truck record")?;
        require_len(&parts, 4, line_no, "truck record")?;
        // Products are 1-based in the file
        let initial_product = (parts[3] as usize).saturating_sub(1);
        instance.add_truck(parts[1], parts[2] as usize, initial_product);
    }

    for _ in 0..nb_depots {
        let (line_no, parts) = next_record("depot record")?;
        require_len(&parts, 3 + nb_products, line_no, "depot record")?;
        let stock = (0..nb_products).map(|p| (p, parts[3 + p])).collect();
        let name = format!("Depot_{}", parts[0] as usize);
        instance.add_depot(parts[1], parts[2], stock, &name);
    }

    for _ in 0..nb_garages {
        let (line_no, parts) = next_record("garage record")?;
        require_len(&parts, 3, line_no, "garage record")?;
        let name = format!("Garage_{}", parts[0] as usize);
        instance.add_garage(parts[1], parts[2], &name);
    }

    for _ in 0..nb_stations {
        let (line_no, parts) = next_record("station record")?;
        require_len(&parts, 3 + nb_products, line_no, "station record")?;
        let demand = (0..nb_products)
            .filter(|&p| parts[3 + p] > 0.0)
            .map(|p| (p, parts[3 + p]))
            .collect();
        let name = format!("Station_{}", parts[0] as usize);
        instance.add_station(parts[1], parts[2], demand, &name);
    }

    Ok(instance)
}

fn require_len(values: &[f64], len: usize, line: usize, what: &str) -> Result<(), LoadError> {
    if values.len() < len {
        return Err(LoadError::format(
            line,
            format!("{} has {} fields, expected {}", what, values.len(), len),
        ));
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "instance".to_string())
}

#[derive(Debug, Serialize, Deserialize)]
struct SiteRecord {
    #[serde(default, skip_deserializing)]
    id: usize,
    x: f64,
    y: f64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct DepotRecord {
    #[serde(default, skip_deserializing)]
    id: usize,
    x: f64,
    y: f64,
    stock: BTreeMap<ProductId, f64>,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct StationRecord {
    #[serde(default, skip_deserializing)]
    id: usize,
    x: f64,
    y: f64,
    demand: BTreeMap<ProductId, f64>,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct TruckRecord {
    #[serde(default, skip_deserializing)]
    id: usize,
    capacity: f64,
    garage_id: usize,
    #[serde(default)]
    initial_product: ProductId,
}

/// JSON document layout with named arrays.
#[derive(Debug, Default, Serialize, Deserialize)]
struct InstanceDocument {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    garages: Vec<SiteRecord>,
    #[serde(default)]
    depots: Vec<DepotRecord>,
    #[serde(default)]
    stations: Vec<StationRecord>,
    #[serde(default)]
    trucks: Vec<TruckRecord>,
    /// Keys are `"from-to"`
    #[serde(default)]
    changeover_costs: BTreeMap<String, f64>,
}

/// Load an instance from a JSON file.
pub fn load_from_json<P: AsRef<Path>>(path: P) -> Result<Instance, LoadError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let mut instance = parse_json(&content)?;
    if instance.name.is_empty() {
        instance.name = file_name(path);
    }
    Ok(instance)
}

/// Parse the JSON format.
pub fn parse_json(content: &str) -> Result<Instance, LoadError> {
    let document: InstanceDocument = serde_json::from_str(content)?;
    let mut instance = Instance::new(document.name.unwrap_or_default());

    for garage in document.garages {
        instance.add_garage(garage.x, garage.y, &garage.name);
    }
    for depot in document.depots {
        instance.add_depot(depot.x, depot.y, depot.stock, &depot.name);
    }
    for station in document.stations {
        instance.add_station(station.x, station.y, station.demand, &station.name);
    }
    for truck in document.trucks {
        instance.add_truck(truck.capacity, truck.garage_id, truck.initial_product);
    }

    let mut changeover = BTreeMap::new();
    for (key, cost) in document.changeover_costs {
        changeover.insert(parse_product_pair(&key)?, cost);
    }
    instance.set_changeover_costs(changeover);

    Ok(instance)
}

fn parse_product_pair(key: &str) -> Result<(ProductId, ProductId), LoadError> {
    let invalid = || LoadError::format(0, format!("invalid changeover key '{}'", key));
    let (from, to) = key.split_once('-').ok_or_else(invalid)?;
    let from = from.trim().parse().map_err(|_| invalid())?;
    let to = to.trim().parse().map_err(|_| invalid())?;
    Ok((from, to))
}

/// Save an instance as JSON.
pub fn save_to_json<P: AsRef<Path>>(instance: &Instance, path: P) -> Result<(), LoadError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &to_document(instance))?;
    Ok(())
}

/// Render an instance as a JSON string.
pub fn to_json_string(instance: &Instance) -> Result<String, LoadError> {
    Ok(serde_json::to_string_pretty(&to_document(instance))?)
}

fn to_document(instance: &Instance) -> InstanceDocument {
    InstanceDocument {
        name: Some(instance.name.clone()),
        garages: instance
            .garages
            .iter()
            .map(|g| SiteRecord {
                id: g.id,
                x: g.x,
                y: g.y,
                name: g.name.clone(),
            })
            .collect(),
        depots: instance
            .depots
            .iter()
            .map(|d| DepotRecord {
                id: d.id,
                x: d.location.x,
                y: d.location.y,
                stock: d.stock.clone(),
                name: d.location.name.clone(),
            })
            .collect(),
        stations: instance
            .stations
            .iter()
            .map(|s| StationRecord {
                id: s.id,
                x: s.location.x,
                y: s.location.y,
                demand: s.demand.clone(),
                name: s.location.name.clone(),
            })
            .collect(),
        trucks: instance
            .trucks
            .iter()
            .map(|t| TruckRecord {
                id: t.id,
                capacity: t.capacity,
                garage_id: t.garage_id,
                initial_product: t.initial_product,
            })
            .collect(),
        changeover_costs: instance
            .changeover_costs
            .iter()
            .map(|(&(from, to), &cost)| (format!("{}-{}", from, to), cost))
            .collect(),
    }
}
