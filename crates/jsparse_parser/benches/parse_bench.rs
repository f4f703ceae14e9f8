use bumpalo::Bump;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jsparse_parser::{parse, ParseOptions};

// A medium-size script (~80 lines) mixing the common constructs
const SCRIPT_SOURCE: &str = r#"
'use strict';

var registry = Object.create(null);
var nextId = 1;

function register(name, factory, options) {
    if (typeof factory !== 'function') {
        throw new TypeError('factory must be a function: ' + name);
    }
    var entry = {
        id: nextId++,
        name: name,
        factory: factory,
        singleton: options && options.singleton === true,
        instance: null
    };
    registry[name] = entry;
    return entry.id;
}

function resolve(name) {
    var entry = registry[name];
    if (!entry) return undefined;
    if (entry.singleton) {
        if (entry.instance === null) {
            entry.instance = entry.factory(resolve);
        }
        return entry.instance;
    }
    return entry.factory(resolve);
}

function dependencies(source) {
    var names = [];
    var pattern = /require\(['"]([^'"]+)['"]\)/g;
    var match;
    while ((match = pattern.exec(source)) !== null) {
        if (names.indexOf(match[1]) < 0) names.push(match[1]);
    }
    return names;
}

var counter = (function () {
    var count = 0;
    return {
        increment: function () { return ++count; },
        reset: function () { count = 0; },
        get value() { return count; }
    };
})();

outer: for (var i = 0; i < 10; i++) {
    for (var j = 0; j < 10; j++) {
        if (i * j > 20) break outer;
        if ((i + j) % 2) continue;
        counter.increment();
    }
}

switch (counter.value) {
    case 0:
        register('empty', function () { return []; });
        break;
    default:
        register('full', function (r) { return [r('empty')]; }, { singleton: true });
}

try {
    resolve('full');
} catch (err) {
    console.error(err.message);
} finally {
    counter.reset();
}
"#;

// A module with classes, destructuring and async code
const MODULE_SOURCE: &str = r#"
import { readFile } from 'fs/promises';
import * as path from 'path';

export const DEFAULT_ENCODING = 'utf8';

export class Cache {
    #entries = new Map();
    #hits = 0;
    static #instances = 0;

    constructor({ limit = 100, ttl = 60_000 } = {}) {
        this.limit = limit;
        this.ttl = ttl;
        Cache.#instances++;
    }

    get size() {
        return this.#entries.size;
    }

    get(key) {
        const entry = this.#entries.get(key);
        if (entry?.expires > Date.now()) {
            this.#hits++;
            return entry.value;
        }
        this.#entries.delete(key);
        return undefined;
    }

    set(key, value) {
        if (this.#entries.size >= this.limit) {
            const [oldest] = this.#entries.keys();
            this.#entries.delete(oldest);
        }
        this.#entries.set(key, { value, expires: Date.now() + this.ttl });
    }

    static get instances() {
        return Cache.#instances;
    }
}

export async function* readAll(files, { encoding = DEFAULT_ENCODING, ...rest } = {}) {
    for (const file of files) {
        const full = path.resolve(rest.base ?? '.', file);
        yield { file, text: await readFile(full, encoding) };
    }
}

export default async function load(files) {
    const cache = new Cache();
    for await (const { file, text } of readAll(files)) {
        cache.set(file, text.split('\n').map((line, n) => `${n + 1}: ${line}`));
    }
    return cache;
}
"#;

fn bench_parse_script(c: &mut Criterion) {
    let options = ParseOptions::script();
    c.bench_function("parse_script_medium", |b| {
        b.iter(|| {
            let arena = Bump::new();
            let program = parse(&arena, black_box(SCRIPT_SOURCE), &options);
            black_box(program.is_ok());
        });
    });
}

fn bench_parse_module(c: &mut Criterion) {
    let options = ParseOptions::module();
    c.bench_function("parse_module_medium", |b| {
        b.iter(|| {
            let arena = Bump::new();
            let program = parse(&arena, black_box(MODULE_SOURCE), &options);
            black_box(program.is_ok());
        });
    });
}

criterion_group!(benches, bench_parse_script, bench_parse_module);
criterion_main!(benches);
