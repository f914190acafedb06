//! Embedded HTML assets. Kept as `&'static str` so the binary serves and
//! writes them without filesystem lookups.

/// Leaflet drawing shared by both pages. Expects a `#map` element and
/// defines `drawMap(view)`, which returns the Leaflet map.
pub const MAP_SCRIPT: &str = r#"
  let __map = null;
  function labelNode(label) {
    const root = document.createElement('div');
    const title = document.createElement('b');
    title.textContent = label.name;
    root.appendChild(title);
    for (const [caption, value] of [['', label.address], ['Horario: ', label.hours],
                                    ['Materiales: ', label.materials], ['Tipo: ', label.type]]) {
      root.appendChild(document.createElement('br'));
      root.appendChild(document.createTextNode(caption + value));
    }
    return root;
  }
  function drawMap(view) {
    if (__map) { __map.remove(); }
    __map = L.map('map').setView([view.center.latitude, view.center.longitude], view.zoom);
    L.tileLayer(view.tiles.url, {attribution: view.tiles.attribution, maxZoom: 19}).addTo(__map);
    const cluster = L.markerClusterGroup();
    for (const marker of view.markers) {
      const icon = L.divIcon({className: 'recycle-marker', html: '<i class="fa-solid fa-recycle"></i>', iconSize: [26, 26]});
      L.marker([marker.position.latitude, marker.position.longitude], {icon, title: marker.label.name})
        .bindPopup(labelNode(marker.label), {maxWidth: 300})
        .addTo(cluster);
    }
    cluster.addTo(__map);
    if (view.focus) {
      L.marker([view.focus.latitude, view.focus.longitude], {
        icon: L.divIcon({className: 'focus-marker', iconSize: [22, 22]}),
      }).bindPopup('Enfoque').addTo(__map);
    }
    if (view.bounds) {
      const box = [[view.bounds.south_west.latitude, view.bounds.south_west.longitude],
                   [view.bounds.north_east.latitude, view.bounds.north_east.longitude]];
      const fit = L.control({position: 'topleft'});
      fit.onAdd = () => {
        const button = L.DomUtil.create('button', 'fit-control');
        button.title = 'Ajustar a los puntos';
        button.innerHTML = '<i class="fa-solid fa-expand"></i>';
        L.DomEvent.disableClickPropagation(button);
        button.onclick = () => __map.fitBounds(box, {padding: [24, 24], maxZoom: 16});
        return button;
      };
      fit.addTo(__map);
    }
    return __map;
  }
"#;

const HEAD: &str = r#"
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css" />
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.css" />
  <script src="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.js"></script>
  <link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.4.1/dist/MarkerCluster.css" />
  <link rel="stylesheet" href="https://unpkg.com/leaflet.markercluster@1.4.1/dist/MarkerCluster.Default.css" />
  <script src="https://unpkg.com/leaflet.markercluster@1.4.1/dist/leaflet.markercluster.js"></script>
  <style>
    body { margin: 0; font-family: sans-serif; background: #E8F5E9; color: #1B5E20; }
    .recycle-marker { background: #2E7D32; color: white; border-radius: 50%; text-align: center; line-height: 26px; }
    .focus-marker { background: #c62828; border: 2px solid white; border-radius: 50%; }
    .fit-control { background: white; border: 2px solid rgba(0,0,0,0.2); border-radius: 4px; width: 34px; height: 34px; cursor: pointer; }
  </style>
"#;

/// Standalone map document; `__MAP_VIEW__` is replaced with the view JSON.
pub const MAP_HTML: &str = r#"<!doctype html>
<html lang="es">
<head>
  <title>Puntos limpios · mapa</title>
  __HEAD__
  <style>#map { position: absolute; inset: 0; }</style>
</head>
<body>
  <div id="map"></div>
  <script>
  __MAP_SCRIPT__
  drawMap(__MAP_VIEW__);
  </script>
</body>
</html>
"#;

pub const LOCATOR_HTML: &str = r#"<!doctype html>
<html lang="es">
<head>
  <title>GreenBot · Buscador de puntos limpios</title>
  __HEAD__
  <style>
    header { text-align: center; padding: 12px; }
    header h1 { color: #2E7D32; margin: 0; font-size: 30px; }
    main { display: grid; grid-template-columns: 260px 1fr 2fr; gap: 16px; padding: 0 16px; }
    #map { height: 550px; }
    #list { max-height: 550px; overflow-y: auto; }
    .entry { border-bottom: 1px solid #A5D6A7; padding: 6px 0; }
    button { background: #A5D6A7; color: #1B5E20; border: 0; border-radius: 8px; padding: 4px 10px; cursor: pointer; }
    button:hover { background: #2E7D32; color: white; }
    .notice { background: #FFF8E1; padding: 8px; border-radius: 8px; }
    #chat { padding: 16px; }
  </style>
</head>
<body>
  <header><h1>🌱 GreenBot</h1><div>Buscador de puntos limpios · Colina</div></header>
  <div id="unavailable" class="notice" hidden></div>
  <main id="app">
    <aside>
      <h3>Filtros</h3>
      <label>Selecciona comuna <select id="comuna"></select></label>
      <p>Materiales (elige uno o varios)</p>
      <select id="materiales" multiple size="10"></select>
      <hr />
      <button id="show-all">Mostrar todos los puntos</button>
      <button id="reload">Recargar datos</button>
      <p id="status"></p>
    </aside>
    <section>
      <h3 id="heading"></h3>
      <div id="list"></div>
    </section>
    <section><div id="map"></div></section>
  </main>
  <section id="chat">
    <h3>🤖 Chat GreenBot</h3>
    <input id="q" size="60" placeholder="Haz una pregunta sobre reciclaje (ej: 'vidrio', 'plástico', 'papel')" />
    <p id="answer"></p>
  </section>
  <script>
  __MAP_SCRIPT__
  const $ = (id) => document.getElementById(id);
  let session = localStorage.getItem('session');

  async function ensureSession() {
    if (!session) {
      const res = await fetch('/api/sessions', {method: 'POST'});
      session = (await res.json()).session;
      localStorage.setItem('session', session);
    }
  }

  function query() {
    const materials = [...$('materiales').selectedOptions].map((o) => o.value).join(',');
    return new URLSearchParams({comuna: $('comuna').value || 'Todas', materiales: materials, session});
  }

  function showUnavailable(body) {
    $('app').hidden = true;
    $('unavailable').hidden = false;
    $('unavailable').textContent = body.error + (body.detail ? ' (' + body.detail + ')' : '');
  }

  async function loadOptions() {
    const res = await fetch('/api/options');
    const body = await res.json();
    if (!res.ok) { showUnavailable(body); return false; }
    $('comuna').replaceChildren(...body.municipalities.map((m) => new Option(m, m)));
    $('materiales').replaceChildren(...body.materials.map((m) => new Option(m, m)));
    return true;
  }

  function putFocus(point) {
    return fetch('/api/sessions/' + session + '/focus', {
      method: 'PUT',
      headers: {'Content-Type': 'application/json'},
      body: JSON.stringify({latitude: point.latitude, longitude: point.longitude}),
    });
  }

  async function focusOn(point) {
    const res = await putFocus(point);
    if (res.status === 404) {
      // expired session: start a fresh one
      session = null;
      localStorage.removeItem('session');
      await ensureSession();
      await putFocus(point);
    }
    await refreshMap();
  }

  async function refreshList() {
    const res = await fetch('/api/points?' + query());
    const body = await res.json();
    if (!res.ok) { showUnavailable(body); return; }
    $('heading').textContent = body.heading;
    const list = $('list');
    list.replaceChildren();
    if (body.empty_message) {
      const note = document.createElement('p');
      note.className = 'notice';
      note.textContent = body.empty_message;
      list.appendChild(note);
    }
    for (const point of body.entries) {
      const row = document.createElement('div');
      row.className = 'entry';
      const name = document.createElement('b');
      name.textContent = point.name;
      row.appendChild(name);
      for (const line of ['📍 ' + point.address, '🕒 ' + point.hours, '♻️ ' + point.materials, '🧾 Tipo: ' + point.type]) {
        row.appendChild(document.createElement('br'));
        row.appendChild(document.createTextNode(line));
      }
      row.appendChild(document.createElement('br'));
      const button = document.createElement('button');
      button.textContent = 'Mostrar en el mapa: ' + point.name;
      button.onclick = () => focusOn(point);
      row.appendChild(button);
      list.appendChild(row);
    }
  }

  async function refreshMap() {
    const res = await fetch('/api/map?' + query());
    if (res.ok) { drawMap(await res.json()); }
  }

  async function refresh() { await refreshList(); await refreshMap(); }

  $('comuna').onchange = refresh;
  $('materiales').onchange = refresh;
  $('show-all').onclick = () => {
    $('comuna').value = 'Todas';
    for (const option of $('materiales').options) { option.selected = false; }
    refresh();
  };
  $('reload').onclick = async () => {
    const res = await fetch('/api/reload', {method: 'POST'});
    const body = await res.json();
    $('status').textContent = res.ok ? body.message : body.error;
    if (res.ok && await loadOptions()) { refresh(); }
  };
  $('q').onchange = async () => {
    const res = await fetch('/api/ask?' + new URLSearchParams({q: $('q').value}));
    $('answer').textContent = (await res.json()).text;
  };

  (async () => {
    await ensureSession();
    if (await loadOptions()) { refresh(); }
  })();
  </script>
</body>
</html>
"#;

/// The locator page with its shared head and map script filled in.
pub fn locator_page() -> String {
    LOCATOR_HTML
        .replace("__HEAD__", HEAD)
        .replace("__MAP_SCRIPT__", MAP_SCRIPT)
}

/// Standalone map page. `view_json` must already be script-safe.
pub fn map_page(view_json: &str) -> String {
    MAP_HTML
        .replace("__HEAD__", HEAD)
        .replace("__MAP_SCRIPT__", MAP_SCRIPT)
        .replace("__MAP_VIEW__", view_json)
}
