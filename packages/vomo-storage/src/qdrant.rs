use std::collections::HashMap;

use qdrant_client::{
	Payload, Qdrant,
	qdrant::{
		Condition, CreateCollectionBuilder, DeletePointsBuilder, Distance, Filter, ListValue,
		PointId, PointStruct, PointsIdsList, Query, QueryPointsBuilder, ScoredPoint, Struct,
		UpsertPointsBuilder, Value, VectorParamsBuilder, point_id::PointIdOptions, value::Kind,
	},
};
use serde_json::Map;

use crate::{IndexMatch, Result};
use vomo_domain::Embedding;

pub struct QdrantIndex {
	pub client: Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantIndex {
	pub fn new(cfg: &vomo_config::Qdrant) -> Result<Self> {
		let client = Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	/// Creates the collection on first startup; a no-op when it exists.
	pub async fn ensure_collection(&self) -> Result<()> {
		if self.client.collection_exists(self.collection.clone()).await? {
			return Ok(());
		}

		let builder = CreateCollectionBuilder::new(self.collection.clone())
			.vectors_config(VectorParamsBuilder::new(u64::from(self.vector_dim), Distance::Cosine));

		self.client.create_collection(builder).await?;

		Ok(())
	}

	/// Writes one point under the memo id. The payload always carries the
	/// owning `user_id`; filtered search depends on it.
	pub async fn upsert(&self, id: &str, embedding: &Embedding, user_id: &str) -> Result<()> {
		let mut payload_map = HashMap::new();

		payload_map.insert("user_id".to_string(), Value::from(user_id.to_string()));

		for (key, value) in &embedding.metadata {
			payload_map.insert(key.clone(), json_to_qdrant(value));
		}

		let payload = Payload::from(payload_map);
		let point = PointStruct::new(id.to_string(), embedding.vector.clone(), payload);
		let upsert = UpsertPointsBuilder::new(self.collection.clone(), vec![point]).wait(true);

		self.client.upsert_points(upsert).await?;

		Ok(())
	}

	/// Nearest neighbors for `vector`, restricted to one user's points.
	pub async fn query(
		&self,
		vector: &[f32],
		user_id: &str,
		limit: u32,
	) -> Result<Vec<IndexMatch>> {
		let filter = Filter::must([Condition::matches("user_id", user_id.to_string())]);
		let search = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector.to_vec()))
			.filter(filter)
			.limit(u64::from(limit))
			.with_payload(true);
		let response = self.client.query(search).await?;
		let mut matches = Vec::with_capacity(response.result.len());

		for point in &response.result {
			let Some(id) = point_id(point) else {
				continue;
			};
			let mut metadata = Map::new();

			for (key, value) in &point.payload {
				metadata.insert(key.clone(), qdrant_to_json(value));
			}

			matches.push(IndexMatch { id, score: point.score, metadata });
		}

		Ok(matches)
	}

	pub async fn delete(&self, id: &str) -> Result<()> {
		let points = PointsIdsList { ids: vec![PointId::from(id.to_string())] };
		let delete = DeletePointsBuilder::new(self.collection.clone()).points(points).wait(true);

		self.client.delete_points(delete).await?;

		Ok(())
	}
}

fn point_id(point: &ScoredPoint) -> Option<String> {
	match point.id.as_ref()?.point_id_options.as_ref()? {
		PointIdOptions::Uuid(id) => Some(id.clone()),
		PointIdOptions::Num(num) => Some(num.to_string()),
	}
}

fn json_to_qdrant(value: &serde_json::Value) -> Value {
	let kind = match value {
		serde_json::Value::Null => Kind::NullValue(0),
		serde_json::Value::Bool(flag) => Kind::BoolValue(*flag),
		serde_json::Value::Number(number) => match number.as_i64() {
			Some(integer) => Kind::IntegerValue(integer),
			None => Kind::DoubleValue(number.as_f64().unwrap_or(0.0)),
		},
		serde_json::Value::String(text) => Kind::StringValue(text.clone()),
		serde_json::Value::Array(items) =>
			Kind::ListValue(ListValue { values: items.iter().map(json_to_qdrant).collect() }),
		serde_json::Value::Object(map) => Kind::StructValue(Struct {
			fields: map.iter().map(|(key, value)| (key.clone(), json_to_qdrant(value))).collect(),
		}),
	};

	Value { kind: Some(kind) }
}

fn qdrant_to_json(value: &Value) -> serde_json::Value {
	match &value.kind {
		Some(Kind::BoolValue(flag)) => (*flag).into(),
		Some(Kind::IntegerValue(integer)) => (*integer).into(),
		Some(Kind::DoubleValue(double)) => serde_json::json!(double),
		Some(Kind::StringValue(text)) => text.clone().into(),
		Some(Kind::ListValue(list)) =>
			serde_json::Value::Array(list.values.iter().map(qdrant_to_json).collect()),
		Some(Kind::StructValue(fields)) => serde_json::Value::Object(
			fields
				.fields
				.iter()
				.map(|(key, value)| (key.clone(), qdrant_to_json(value)))
				.collect(),
		),
		Some(Kind::NullValue(_)) | None => serde_json::Value::Null,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn payload_values_round_trip() {
		let json = serde_json::json!({
			"user_id": "u1",
			"count": 3,
			"score": 0.5,
			"flag": true,
			"tags": ["a", "b"],
			"nested": { "key": null }
		});
		let serde_json::Value::Object(map) = json else {
			panic!("Expected an object.");
		};

		for (key, value) in &map {
			assert_eq!(&qdrant_to_json(&json_to_qdrant(value)), value, "mismatch at {key}");
		}
	}
}
