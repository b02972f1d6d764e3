use crate::db::indices::*;
use crate::error::BoardError;
use crate::geom::point::Point;
use crate::geom::rect::Rect;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    EdgeCuts,
    Copper(u8),
}

#[derive(Clone, Debug)]
pub struct NetInfo {
    pub name: String,
}

#[derive(Clone, Debug)]
pub enum DrawShape {
    Segment {
        a: Point<f64>,
        b: Point<f64>,
    },
    Arc {
        center: Point<f64>,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    Circle {
        center: Point<f64>,
        radius: f64,
    },
    Polygon {
        points: Vec<Point<f64>>,
    },
}

impl DrawShape {
    pub fn bounding_box(&self) -> Rect {
        match self {
            DrawShape::Segment { a, b } => Rect::from_points(&[*a, *b]),
            DrawShape::Circle { center, radius } | DrawShape::Arc { center, radius, .. } => {
                Rect::new(
                    Point::new(center.x - radius, center.y - radius),
                    Point::new(center.x + radius, center.y + radius),
                )
            }
            DrawShape::Polygon { points } => Rect::from_points(points),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Drawing {
    pub shape: DrawShape,
    pub layer: Layer,
    pub footprint: Option<FootprintId>,
}

#[derive(Clone, Debug)]
pub struct Pad {
    pub position: Point<f64>,
    pub radius: f64,
    pub drill: f64,
    pub plated: bool,
    pub net: Option<NetId>,
    // None reaches every copper layer (through-hole).
    pub layer: Option<u8>,
    pub footprint: Option<FootprintId>,
}

impl Pad {
    pub fn on_layer(&self, layer: u8) -> bool {
        self.layer.is_none_or(|l| l == layer)
    }
}

#[derive(Clone, Debug)]
pub struct TrackSeg {
    pub a: Point<f64>,
    pub b: Point<f64>,
    pub width: f64,
    pub net: NetId,
    pub layer: u8,
}

#[derive(Clone, Debug)]
pub enum ItemData {
    Pad(Pad),
    Track(TrackSeg),
    Drawing(Drawing),
}

#[derive(Clone, Debug)]
pub struct Footprint {
    pub reference: String,
    pub items: Vec<ItemId>,
}

pub struct BoardDB {
    pub nets: Vec<NetInfo>,
    pub items: Vec<ItemData>,
    pub footprints: Vec<Footprint>,
    pub copper_layers: u8,

    pub net_name_map: HashMap<String, NetId>,
}

impl Default for BoardDB {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardDB {
    pub fn new() -> Self {
        Self {
            nets: Vec::new(),
            items: Vec::with_capacity(1000),
            footprints: Vec::new(),
            copper_layers: 2,
            net_name_map: HashMap::new(),
        }
    }

    pub fn num_nets(&self) -> usize {
        self.nets.len()
    }

    pub fn add_net(&mut self, name: &str) -> NetId {
        if let Some(&id) = self.net_name_map.get(name) {
            return id;
        }
        let id = NetId::new(self.nets.len());
        self.nets.push(NetInfo {
            name: name.to_string(),
        });
        self.net_name_map.insert(name.to_string(), id);
        id
    }

    pub fn find_net(&self, name: &str) -> Result<NetId, BoardError> {
        self.net_name_map
            .get(name)
            .copied()
            .ok_or_else(|| BoardError::UnknownNet(name.to_string()))
    }

    pub fn add_footprint(&mut self, reference: &str) -> FootprintId {
        let id = FootprintId::new(self.footprints.len());
        self.footprints.push(Footprint {
            reference: reference.to_string(),
            items: Vec::new(),
        });
        id
    }

    fn push_item(&mut self, item: ItemData, footprint: Option<FootprintId>) -> ItemId {
        let id = ItemId::new(self.items.len());
        self.items.push(item);
        if let Some(fp) = footprint {
            self.footprints[fp.index()].items.push(id);
        }
        id
    }

    pub fn add_pad(&mut self, pad: Pad) -> ItemId {
        let fp = pad.footprint;
        self.push_item(ItemData::Pad(pad), fp)
    }

    pub fn add_track(&mut self, track: TrackSeg) -> ItemId {
        self.push_item(ItemData::Track(track), None)
    }

    pub fn add_drawing(&mut self, drawing: Drawing) -> ItemId {
        let fp = drawing.footprint;
        self.push_item(ItemData::Drawing(drawing), fp)
    }

    pub fn item(&self, id: ItemId) -> &ItemData {
        &self.items[id.index()]
    }

    pub fn pads(&self) -> impl Iterator<Item = (ItemId, &Pad)> {
        self.items.iter().enumerate().filter_map(|(i, item)| match item {
            ItemData::Pad(p) => Some((ItemId::new(i), p)),
            _ => None,
        })
    }

    pub fn tracks(&self) -> impl Iterator<Item = (ItemId, &TrackSeg)> {
        self.items.iter().enumerate().filter_map(|(i, item)| match item {
            ItemData::Track(t) => Some((ItemId::new(i), t)),
            _ => None,
        })
    }

    pub fn drawings(&self) -> impl Iterator<Item = (ItemId, &Drawing)> {
        self.items.iter().enumerate().filter_map(|(i, item)| match item {
            ItemData::Drawing(d) => Some((ItemId::new(i), d)),
            _ => None,
        })
    }

    // An unclosed outline ring is the one hard failure creepage
    // testing escalates.
    pub fn outline_polygons(&self) -> Result<Vec<Vec<Point<f64>>>, BoardError> {
        let mut rings = Vec::new();
        for (_, d) in self.drawings() {
            if d.layer != Layer::EdgeCuts {
                continue;
            }
            if let DrawShape::Polygon { points } = &d.shape {
                if points.len() < 3 {
                    return Err(BoardError::InvalidOutline {
                        vertices: points.len(),
                    });
                }
                rings.push(points.clone());
            }
        }
        Ok(rings)
    }

    pub fn describe(&self, id: ItemId) -> String {
        match self.item(id) {
            ItemData::Pad(p) => {
                let host = p
                    .footprint
                    .map(|fp| self.footprints[fp.index()].reference.clone())
                    .unwrap_or_else(|| "board".to_string());
                match p.net {
                    Some(n) => format!("pad of {} (net '{}')", host, self.nets[n.index()].name),
                    None => format!("NPTH pad of {}", host),
                }
            }
            ItemData::Track(t) => {
                format!(
                    "track on layer {} (net '{}')",
                    t.layer,
                    self.nets[t.net.index()].name
                )
            }
            ItemData::Drawing(d) => match d.layer {
                Layer::EdgeCuts => "edge-cuts item".to_string(),
                Layer::Copper(l) => format!("graphic on copper layer {}", l),
            },
        }
    }
}
